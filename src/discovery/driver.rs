//! Discovery runs over a source's document set

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::config::DiscoveryConfig;
use super::coverage::{clear_coverage, compute_coverage};
use super::digest::{IdDigester, PluralStripDigester};
use super::discoverer::{DiscoveryContext, discover_class};
use super::error::{DiscoveryError, Result};
use super::registry::ClassRegistry;
use super::types::Model;
use crate::source::{DocumentSource, root_objects};

/// Summary of a discovered model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryStats {
    /// Root objects folded into the root class
    pub root_instances: usize,
    /// Classes discovered
    pub classes: usize,
    /// Fields across all classes
    pub fields: usize,
    /// Fields holding scalars
    pub attributes: usize,
    /// Fields holding nested classes
    pub references: usize,
    /// Fields first observed as arrays
    pub many_valued_fields: usize,
    /// Fields missing from the instance that created their class
    pub optional_fields: usize,
}

impl DiscoveryStats {
    pub fn from_model(model: &Model) -> Self {
        let mut stats = DiscoveryStats {
            root_instances: model.root_class().map_or(0, |c| c.occurrence_count()),
            classes: model.classes.len(),
            ..Default::default()
        };
        for field in model.classes.iter().flat_map(|c| c.fields()) {
            stats.fields += 1;
            if field.is_reference() {
                stats.references += 1;
            } else {
                stats.attributes += 1;
            }
            if field.multiplicity().is_many() {
                stats.many_valued_fields += 1;
            }
            if !field.required() {
                stats.optional_fields += 1;
            }
        }
        stats
    }
}

/// Discovers models from document sets
///
/// Each call runs with a fresh registry owned by that call, so one
/// discoverer can serve any number of independent runs.
#[derive(Debug, Clone, Default)]
pub struct ModelDiscoverer<D: IdDigester = PluralStripDigester> {
    config: DiscoveryConfig,
    digester: D,
}

impl ModelDiscoverer {
    /// Create a discoverer with default configuration and naming
    pub fn new() -> Self {
        Self::with_config(DiscoveryConfig::default())
    }

    /// Create a discoverer with custom configuration
    pub fn with_config(config: DiscoveryConfig) -> Self {
        Self {
            config,
            digester: PluralStripDigester,
        }
    }
}

impl<D: IdDigester> ModelDiscoverer<D> {
    /// Create a discoverer with a custom class naming policy
    pub fn with_digester(config: DiscoveryConfig, digester: D) -> Self {
        Self { config, digester }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover a model from `documents`, all belonging to `source_name`.
    ///
    /// Array documents are unrolled into their object elements; scalar roots
    /// are skipped. Every root object refines the same root class, named by
    /// digesting `source_name`.
    pub fn discover(&self, source_name: &str, documents: &[Value]) -> Result<Model> {
        if documents.is_empty() {
            return Err(DiscoveryError::invalid(format!(
                "the source [{}] must include at least one document",
                source_name
            )));
        }
        self.run(source_name, ClassRegistry::new(), root_objects(documents))
    }

    /// Discover a model from a [`DocumentSource`]
    pub fn discover_source(&self, source: &DocumentSource) -> Result<Model> {
        if source.is_empty() {
            return Err(DiscoveryError::invalid(format!(
                "the source [{}] must include at least one document",
                source.name()
            )));
        }
        self.run(source.name(), ClassRegistry::new(), source.digest_roots())
    }

    /// Refine an existing model with more documents of the same source.
    ///
    /// Counts carry on from the model; coverage is recomputed.
    pub fn refine(&self, model: Model, documents: &[Value]) -> Result<Model> {
        if documents.is_empty() {
            return Err(DiscoveryError::invalid(format!(
                "refining [{}] needs at least one document",
                model.name
            )));
        }
        let name = model.name.clone();
        self.run(&name, seeded_registry(model), root_objects(documents))
    }

    /// Refine an existing model with the documents of a [`DocumentSource`]
    pub fn refine_with_source(&self, model: Model, source: &DocumentSource) -> Result<Model> {
        if source.is_empty() {
            return Err(DiscoveryError::invalid(format!(
                "refining [{}] needs at least one document",
                model.name
            )));
        }
        let name = model.name.clone();
        self.run(&name, seeded_registry(model), source.digest_roots())
    }

    fn run<I, R>(&self, source_name: &str, mut registry: ClassRegistry, roots: I) -> Result<Model>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<Map<String, Value>>,
    {
        let root_id = self.digester.digest(source_name)?;

        let mut root_count = 0usize;
        {
            let mut ctx = DiscoveryContext::new(&mut registry, &self.digester)
                .with_max_depth(self.config.max_depth);
            for root in roots {
                discover_class(&mut ctx, &root_id, root.borrow())?;
                root_count += 1;
            }
        }
        debug!(source = source_name, root_count, "Root objects discovered");

        if root_count == 0 {
            warn!(source = source_name, "Source holds no root objects");
        }

        let mut model = Model {
            name: source_name.to_string(),
            ns_uri: self.config.ns_uri_for(source_name),
            ns_prefix: self.config.ns_prefix_for(source_name),
            root: root_id,
            classes: registry.into_classes(),
        };
        compute_coverage(model.classes.iter_mut());

        info!(
            source = source_name,
            classes = model.classes.len(),
            root_objects = root_count,
            "Model discovered"
        );
        Ok(model)
    }
}

fn seeded_registry(mut model: Model) -> ClassRegistry {
    clear_coverage(model.classes.iter_mut());
    ClassRegistry::from_classes(model.classes)
}
