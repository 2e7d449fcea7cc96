//! Structural checks over a discovered model
//!
//! Builds the containment graph (class -> class, one edge per reference
//! field) and checks the invariants every finished model should satisfy.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::Dfs;
use petgraph::Directed;
use serde::{Deserialize, Serialize};

use crate::discovery::Model;

const RATIO_TOLERANCE: f64 = 1e-9;

/// A reference field pointing at a class the model does not contain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReference {
    pub class: String,
    pub field: String,
    pub target: String,
}

/// A field observed more often than its class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountViolation {
    pub class: String,
    pub field: String,
    pub field_count: usize,
    pub class_count: usize,
}

/// A missing, out-of-range or stale coverage ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageViolation {
    pub class: String,
    pub field: String,
    pub ratio: Option<f64>,
    pub expected: f64,
}

/// Result of model validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelValidationResult {
    /// Classes not reachable from the root class through references. These
    /// come from objects whose field settled as a String attribute (mixed
    /// arrays, attributes refined with objects); reported, not an error.
    pub unreachable_classes: Vec<String>,
    pub dangling_references: Vec<DanglingReference>,
    pub count_violations: Vec<CountViolation>,
    pub coverage_violations: Vec<CoverageViolation>,
    /// Classes that (transitively) contain themselves. Allowed, reported for
    /// writers that cannot express recursive containment.
    pub recursive_classes: Vec<String>,
}

impl ModelValidationResult {
    pub fn is_valid(&self) -> bool {
        self.dangling_references.is_empty()
            && self.count_violations.is_empty()
            && self.coverage_violations.is_empty()
    }
}

/// Model validator
#[derive(Debug, Default)]
pub struct ModelValidator;

impl ModelValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, model: &Model) -> ModelValidationResult {
        let mut result = ModelValidationResult::default();

        let mut graph = Graph::<&str, &str, Directed>::new();
        let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();
        for class in &model.classes {
            node_map.insert(class.id(), graph.add_node(class.id()));
        }

        for class in &model.classes {
            let source = node_map[class.id()];
            for field in class.references() {
                let Some(target_id) = field.value_type().class_id() else {
                    continue;
                };
                match node_map.get(target_id) {
                    Some(&target) => {
                        graph.add_edge(source, target, field.name());
                    }
                    None => result.dangling_references.push(DanglingReference {
                        class: class.id().to_string(),
                        field: field.name().to_string(),
                        target: target_id.to_string(),
                    }),
                }
            }

            let class_count = class.occurrence_count();
            for field in class.fields() {
                if field.occurrence_count() > class_count {
                    result.count_violations.push(CountViolation {
                        class: class.id().to_string(),
                        field: field.name().to_string(),
                        field_count: field.occurrence_count(),
                        class_count,
                    });
                }

                let expected = if class_count == 0 {
                    0.0
                } else {
                    field.occurrence_count() as f64 / class_count as f64
                };
                let consistent = field.coverage().is_some_and(|ratio| {
                    (0.0..=1.0).contains(&ratio) && (ratio - expected).abs() < RATIO_TOLERANCE
                });
                if !consistent {
                    result.coverage_violations.push(CoverageViolation {
                        class: class.id().to_string(),
                        field: field.name().to_string(),
                        ratio: field.coverage(),
                        expected,
                    });
                }
            }
        }

        result.unreachable_classes = self.unreachable_from_root(model, &graph, &node_map);
        result.recursive_classes = self.recursive_classes(&graph);
        result
    }

    fn unreachable_from_root(
        &self,
        model: &Model,
        graph: &Graph<&str, &str, Directed>,
        node_map: &HashMap<&str, NodeIndex>,
    ) -> Vec<String> {
        let Some(&root) = node_map.get(model.root.as_str()) else {
            return model.class_ids().into_iter().map(str::to_string).collect();
        };

        let mut reachable = vec![false; graph.node_count()];
        let mut dfs = Dfs::new(graph, root);
        while let Some(node) = dfs.next(graph) {
            reachable[node.index()] = true;
        }

        graph
            .node_indices()
            .filter(|node| !reachable[node.index()])
            .map(|node| graph[node].to_string())
            .collect()
    }

    fn recursive_classes(&self, graph: &Graph<&str, &str, Directed>) -> Vec<String> {
        let mut recursive = Vec::new();
        for component in tarjan_scc(graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| graph.contains_edge(node, node));
            if cyclic {
                recursive.extend(component.iter().map(|&node| graph[node].to_string()));
            }
        }
        recursive.sort();
        recursive
    }
}
