//! Discovered model types: classes, fields and their resolved types

use serde::{Deserialize, Serialize};

use super::error::{DiscoveryError, Result};

/// Scalar kinds a field can resolve to
///
/// Numbers are not split into integer and floating point; every numeric
/// scalar is `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    String,
    Integer,
    Boolean,
}

impl PrimitiveKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "String",
            PrimitiveKind::Integer => "Integer",
            PrimitiveKind::Boolean => "Boolean",
        }
    }
}

/// Result of resolving a value's type
///
/// Two resolved types are the same only if they are the same primitive kind
/// or name the same class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvedType {
    Primitive(PrimitiveKind),
    /// A discovered class, by id
    Class(String),
}

impl ResolvedType {
    /// The generic fallback type
    pub const STRING: ResolvedType = ResolvedType::Primitive(PrimitiveKind::String);

    pub fn is_primitive(&self) -> bool {
        matches!(self, ResolvedType::Primitive(_))
    }

    /// Id of the referenced class, if this is a class type
    pub fn class_id(&self) -> Option<&str> {
        match self {
            ResolvedType::Class(id) => Some(id),
            ResolvedType::Primitive(_) => None,
        }
    }

    /// Display name: the primitive kind name or the class id
    pub fn type_name(&self) -> &str {
        match self {
            ResolvedType::Primitive(kind) => kind.type_name(),
            ResolvedType::Class(id) => id,
        }
    }
}

/// Whether a field holds scalars or nested objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Attribute,
    /// Containment reference to another class
    Reference,
}

/// Upper bound of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Multiplicity {
    One,
    Many,
}

impl Multiplicity {
    pub fn is_many(&self) -> bool {
        matches!(self, Multiplicity::Many)
    }
}

/// A structural member of a discovered class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    name: String,
    kind: FieldKind,
    value_type: ResolvedType,
    multiplicity: Multiplicity,
    required: bool,
    occurrence_count: usize,
    /// Presence ratio, attached once discovery has finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coverage: Option<f64>,
}

impl FieldDef {
    /// Create a field observed once. The kind follows from `value_type`.
    pub fn new(
        name: impl Into<String>,
        value_type: ResolvedType,
        multiplicity: Multiplicity,
        required: bool,
    ) -> Self {
        let kind = if value_type.is_primitive() {
            FieldKind::Attribute
        } else {
            FieldKind::Reference
        };
        Self {
            name: name.into(),
            kind,
            value_type,
            multiplicity,
            required,
            occurrence_count: 1,
            coverage: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value_type(&self) -> &ResolvedType {
        &self.value_type
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// Whether the field was present on the instance that created its class
    pub fn required(&self) -> bool {
        self.required
    }

    /// Number of class instances in which the field was observed
    pub fn occurrence_count(&self) -> usize {
        self.occurrence_count
    }

    /// Presence ratio within the owning class, once computed
    pub fn coverage(&self) -> Option<f64> {
        self.coverage
    }

    pub fn is_attribute(&self) -> bool {
        self.kind == FieldKind::Attribute
    }

    pub fn is_reference(&self) -> bool {
        self.kind == FieldKind::Reference
    }

    /// References always own their target
    pub fn containment(&self) -> bool {
        self.is_reference()
    }

    /// Widen an attribute to `String` after a type conflict.
    ///
    /// Returns true if the type changed. References and attributes that are
    /// already `String` are left alone.
    pub fn degrade_to_string(&mut self) -> bool {
        if self.is_reference() || self.value_type == ResolvedType::STRING {
            return false;
        }
        self.value_type = ResolvedType::STRING;
        true
    }

    pub(crate) fn record_occurrence(&mut self) {
        self.occurrence_count += 1;
    }

    pub(crate) fn mark_required(&mut self) {
        self.required = true;
    }

    pub(crate) fn set_coverage(&mut self, ratio: f64) {
        self.coverage = Some(ratio);
    }

    pub(crate) fn clear_coverage(&mut self) {
        self.coverage = None;
    }
}

/// A discovered entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDef {
    id: String,
    fields: Vec<FieldDef>,
    occurrence_count: usize,
}

impl ClassDef {
    /// Create a class seen on one instance, with no fields yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            occurrence_count: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fields in the order they were first observed
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Number of instances that contributed to this class
    pub fn occurrence_count(&self) -> usize {
        self.occurrence_count
    }

    /// Reference fields of this class
    pub fn references(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_reference())
    }

    /// Look up a field the caller expects to exist
    pub fn require_field(&self, name: &str) -> Result<&FieldDef> {
        self.field(name).ok_or_else(|| {
            DiscoveryError::invalid(format!("class {} has no field {}", self.id, name))
        })
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldDef> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [FieldDef] {
        &mut self.fields
    }

    pub(crate) fn record_occurrence(&mut self) {
        self.occurrence_count += 1;
    }

    /// Append a field; names are unique within a class
    pub(crate) fn push_field(&mut self, field: FieldDef) -> Result<()> {
        if self.has_field(&field.name) {
            return Err(DiscoveryError::invalid(format!(
                "field {} already exists in class {}",
                field.name, self.id
            )));
        }
        self.fields.push(field);
        Ok(())
    }
}

/// The classes discovered from one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Source name the model was discovered from
    pub name: String,
    pub ns_uri: String,
    pub ns_prefix: String,
    /// Id of the class built from the source's root documents
    pub root: String,
    /// Every class created during the run, in creation order
    pub classes: Vec<ClassDef>,
}

impl Model {
    pub fn class(&self, id: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn root_class(&self) -> Option<&ClassDef> {
        self.class(&self.root)
    }

    pub fn class_ids(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.id()).collect()
    }

    /// Look up a class the caller expects to exist
    pub fn require_class(&self, id: &str) -> Result<&ClassDef> {
        self.class(id)
            .ok_or_else(|| DiscoveryError::invalid(format!("model has no class {}", id)))
    }
}
