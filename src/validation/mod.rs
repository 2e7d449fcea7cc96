//! Validation functionality
//!
//! Provides structural checks over discovered models (reachability,
//! dangling references, occurrence counts and coverage ratios).

pub mod model;

pub use model::{
    CountViolation, CoverageViolation, DanglingReference, ModelValidationResult, ModelValidator,
};
