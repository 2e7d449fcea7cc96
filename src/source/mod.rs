//! Document sources
//!
//! A source is a named set of documents with the same meaning, for instance
//! every response of one JSON-based Web API. Documents are generic
//! `serde_json::Value` trees, parsed from JSON or converted from YAML.
//!
//! ## Example
//!
//! ```rust
//! use data_model_discoverer::{DocumentSource, ModelDiscoverer};
//!
//! let mut source = DocumentSource::new("orders").unwrap();
//! source.add_json_str(r#"[{"sku": "BL394D", "quantity": 4}]"#).unwrap();
//! source.add_yaml_str("sku: BL4438H\nquantity: 1\nprice: 2392.00\n").unwrap();
//!
//! let model = ModelDiscoverer::new().discover_source(&source).unwrap();
//! assert_eq!(model.root, "Order");
//! ```

mod yaml;

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::discovery::{DiscoveryError, Result};

pub use yaml::{parse_yaml_documents, yaml_to_value};

/// One document of a source, optionally paired with the input object that
/// produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Map<String, Value>>,
    pub data: Value,
}

/// A named set of documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSource {
    name: String,
    documents: Vec<SourceDocument>,
}

impl DocumentSource {
    /// Create an empty source. Fails on an empty name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DiscoveryError::invalid("source name cannot be empty"));
        }
        Ok(Self {
            name,
            documents: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Add an already parsed document
    pub fn add_document(&mut self, document: Value) {
        self.documents.push(SourceDocument {
            input: None,
            data: document,
        });
    }

    /// Add a document together with the input object that produced it.
    ///
    /// The input becomes the root object, with the output attached under
    /// `<name>Output`.
    pub fn add_document_with_input(&mut self, input: Map<String, Value>, output: Value) {
        self.documents.push(SourceDocument {
            input: Some(input),
            data: output,
        });
    }

    /// Parse and add one JSON document
    pub fn add_json_str(&mut self, json: &str) -> Result<()> {
        let document: Value = serde_json::from_str(json)?;
        self.add_document(document);
        Ok(())
    }

    /// Parse and add every document of a YAML stream
    pub fn add_yaml_str(&mut self, yaml: &str) -> Result<()> {
        let documents = parse_yaml_documents(yaml)?;
        debug!(source = %self.name, documents = documents.len(), "YAML documents parsed");
        for document in documents {
            self.add_document(document);
        }
        Ok(())
    }

    /// Read and add a JSON file
    pub fn add_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(path.as_ref())?;
        self.add_json_str(&content)
    }

    /// Read and add a YAML file
    pub fn add_yaml_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(path.as_ref())?;
        self.add_yaml_str(&content)
    }

    /// Flatten the documents into the root objects discovery runs over.
    ///
    /// Paired documents yield their input object extended with the output;
    /// the others are unrolled as in [`root_objects`].
    pub fn digest_roots(&self) -> Vec<Cow<'_, Map<String, Value>>> {
        let mut roots = Vec::new();
        for document in &self.documents {
            match &document.input {
                Some(input) => {
                    let mut combined = input.clone();
                    combined.insert(format!("{}Output", self.name), document.data.clone());
                    roots.push(Cow::Owned(combined));
                }
                None => roots.extend(
                    root_objects(std::slice::from_ref(&document.data))
                        .into_iter()
                        .map(Cow::Borrowed),
                ),
            }
        }
        roots
    }
}

/// Root objects of a document set.
///
/// Array documents contribute their object elements, object documents
/// themselves; anything else is skipped.
pub fn root_objects(documents: &[Value]) -> Vec<&Map<String, Value>> {
    let mut roots = Vec::new();
    for document in documents {
        match document {
            Value::Array(items) => roots.extend(items.iter().filter_map(Value::as_object)),
            Value::Object(object) => roots.push(object),
            _ => {}
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            DocumentSource::new(""),
            Err(DiscoveryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_root_objects_unrolls_arrays() {
        let documents = vec![
            json!([{"a": 1}, 2, {"a": 3}, [{"nested": true}]]),
            json!({"b": 2}),
            json!("scalar"),
            Value::Null,
        ];
        let roots = root_objects(&documents);
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[0]["a"], json!(1));
        assert_eq!(roots[1]["a"], json!(3));
        assert_eq!(roots[2]["b"], json!(2));
    }

    #[test]
    fn test_digest_roots_with_input() {
        let mut source = DocumentSource::new("weather").unwrap();
        let input = json!({"city": "Royal Oak"}).as_object().cloned().unwrap();
        source.add_document_with_input(input, json!({"temp": 21}));
        source.add_document(json!([{"city": "Troy"}]));

        let roots = source.digest_roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0]["weatherOutput"], json!({"temp": 21}));
        assert_eq!(roots[0]["city"], json!("Royal Oak"));
        assert!(matches!(roots[1], Cow::Borrowed(_)));
    }

    #[test]
    fn test_add_json_str() {
        let mut source = DocumentSource::new("orders").unwrap();
        source.add_json_str(r#"{"sku": "BL394D"}"#).unwrap();
        assert_eq!(source.len(), 1);
        assert!(matches!(
            source.add_json_str("{not json"),
            Err(DiscoveryError::JsonParse(_))
        ));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_add_yaml_str() {
        let mut source = DocumentSource::new("orders").unwrap();
        source.add_yaml_str("sku: A\n---\nsku: B\n").unwrap();
        assert_eq!(source.len(), 2);
        assert!(matches!(
            source.add_yaml_str("sku: [A"),
            Err(DiscoveryError::YamlParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let mut source = DocumentSource::new("orders").unwrap();
        assert!(matches!(
            source.add_json_file("/definitely/not/here.json"),
            Err(DiscoveryError::Io(_))
        ));
    }
}
