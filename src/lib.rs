//! Data Model Discoverer - infers class-based data models from example documents
//!
//! Provides:
//! - Document sources (JSON and YAML documents, files, input/output pairs)
//! - Model discovery (class discovery, type unification, coverage)
//! - Structural validation of discovered models

pub mod discovery;
pub mod source;
pub mod validation;

// Re-export commonly used types
pub use discovery::{
    ClassDef, DiscoveryConfig, DiscoveryError, DiscoveryStats, FieldDef, FieldKind, Model,
    ModelDiscoverer, Multiplicity, PrimitiveKind, ResolvedType,
};
pub use source::DocumentSource;
pub use validation::{ModelValidationResult, ModelValidator};
