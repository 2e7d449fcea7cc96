//! YAML to document value conversion

use serde::Deserialize;
use serde_json::{Number, Value};
use serde_yaml::Value as YamlValue;

use crate::discovery::Result;

/// Convert a YAML value into a document value.
///
/// Mapping keys become strings (scalars via their text form, anything else
/// serialized as YAML). Tags are dropped in favour of the tagged value.
/// Floats a JSON number cannot hold (`.nan`, `.inf`) are kept as their
/// text, so a field observed only with such values types as `String` rather
/// than `Integer`.
pub fn yaml_to_value(yaml: YamlValue) -> Value {
    match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.to_string()))
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_value).collect()),
        YamlValue::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (mapping_key(&key), yaml_to_value(value)))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => yaml_to_value(tagged.value),
    }
}

fn mapping_key(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => mapping_key(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{:?}", other)),
    }
}

/// Parse every document of a YAML stream
pub fn parse_yaml_documents(yaml: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(yaml) {
        let value = YamlValue::deserialize(document)?;
        documents.push(yaml_to_value(value));
    }
    Ok(documents)
}
