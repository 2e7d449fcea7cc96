//! Model discovery engine for tree-shaped documents
//!
//! This module infers a class-based model from JSON or YAML documents with no
//! prior schema: every object becomes an instance of a class named after the
//! field that holds it, and repeated observations refine those classes.
//!
//! ## Features
//!
//! - **Class discovery** - Objects become classes keyed by a digested field name
//! - **Type unification** - Conflicting scalar observations widen to `String`
//! - **Array handling** - Homogeneous arrays keep their element type, mixed ones become `String`
//! - **Required tracking** - Fields of the first instance are required, later ones optional
//! - **Coverage** - Presence ratio of every field across its class's instances
//!
//! ## Example
//!
//! ```rust
//! use data_model_discoverer::discovery::ModelDiscoverer;
//! use serde_json::json;
//!
//! let documents = vec![json!({"billTo": {"given": "Chris", "family": "Dumars"}})];
//! let model = ModelDiscoverer::new().discover("Invoice", &documents)?;
//!
//! let invoice = model.root_class().unwrap();
//! assert!(invoice.field("billTo").unwrap().is_reference());
//! assert!(model.class("BillTo").is_some());
//! # Ok::<(), data_model_discoverer::discovery::DiscoveryError>(())
//! ```

mod config;
mod coverage;
mod digest;
mod discoverer;
mod driver;
mod error;
mod registry;
mod resolver;
mod types;

pub use config::{
    DEFAULT_NS_PREFIX_BASE, DEFAULT_NS_URI_BASE, DiscoveryConfig, DiscoveryConfigBuilder,
};
pub use coverage::compute_coverage;
pub use digest::{IdDigester, PluralStripDigester, digest_id};
pub use discoverer::{DiscoveryContext, create_field, discover_class};
pub use driver::{DiscoveryStats, ModelDiscoverer};
pub use error::{DiscoveryError, Result};
pub use registry::ClassRegistry;
pub use resolver::resolve_type;
pub use types::{ClassDef, FieldDef, FieldKind, Model, Multiplicity, PrimitiveKind, ResolvedType};
