//! Class discovery and refinement
//!
//! A class is created the first time its id is seen and refined in place on
//! every later encounter. Fields present on the creating instance are
//! required; fields first seen on a later instance are optional. Fields are
//! never removed.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::digest::IdDigester;
use super::error::{DiscoveryError, Result};
use super::registry::ClassRegistry;
use super::resolver::resolve_type;
use super::types::{ClassDef, FieldDef, Multiplicity};

/// Mutable state threaded through one recursive discovery pass
pub struct DiscoveryContext<'a> {
    registry: &'a mut ClassRegistry,
    digester: &'a dyn IdDigester,
    max_depth: Option<usize>,
    depth: usize,
}

impl<'a> DiscoveryContext<'a> {
    pub fn new(registry: &'a mut ClassRegistry, digester: &'a dyn IdDigester) -> Self {
        Self {
            registry,
            digester,
            max_depth: None,
            depth: 0,
        }
    }

    /// Abort resolution below `max_depth` levels of nesting
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &ClassRegistry {
        self.registry
    }

    pub(crate) fn digest(&self, name: &str) -> Result<String> {
        self.digester.digest(name)
    }

    /// Run `f` one nesting level deeper
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let depth = self.depth + 1;
        if let Some(max) = self.max_depth {
            if depth > max {
                return Err(DiscoveryError::MaxDepthExceeded { depth, max });
            }
        }
        self.depth = depth;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn class_mut(&mut self, id: &str) -> Result<&mut ClassDef> {
        self.registry
            .get_mut(id)
            .ok_or_else(|| DiscoveryError::invalid(format!("class {} is not registered", id)))
    }

    fn field_mut(&mut self, class_id: &str, name: &str) -> Result<&mut FieldDef> {
        self.class_mut(class_id)?.field_mut(name).ok_or_else(|| {
            DiscoveryError::invalid(format!("class {} has no field {}", class_id, name))
        })
    }
}

/// Create or refine the class `id` from one object instance.
///
/// Returns the id of the class, which is also how the class is referenced
/// from fields.
pub fn discover_class(
    ctx: &mut DiscoveryContext<'_>,
    id: &str,
    object: &Map<String, Value>,
) -> Result<String> {
    if id.is_empty() {
        return Err(DiscoveryError::invalid("id cannot be empty"));
    }

    if ctx.registry.contains(id) {
        refine_class(ctx, id, object)?;
    } else {
        create_class(ctx, id, object)?;
    }
    Ok(id.to_string())
}

fn create_class(ctx: &mut DiscoveryContext<'_>, id: &str, object: &Map<String, Value>) -> Result<()> {
    // Registered before its fields are typed so nested objects digesting to
    // the same id refine this class rather than creating a second one
    ctx.registry.put(ClassDef::new(id));
    debug!(class = id, fields = object.len(), "Class created");

    for (key, value) in object {
        // Typing an earlier sibling that nests this class may have added the field
        if ctx.class_mut(id)?.has_field(key) {
            refine_field(ctx, id, key, value)?;
            ctx.field_mut(id, key)?.mark_required();
        } else {
            create_field(ctx, id, key, value, true)?;
        }
    }
    Ok(())
}

fn refine_class(ctx: &mut DiscoveryContext<'_>, id: &str, object: &Map<String, Value>) -> Result<()> {
    ctx.class_mut(id)?.record_occurrence();
    debug!(class = id, "Refining class");

    for (key, value) in object {
        if ctx.class_mut(id)?.has_field(key) {
            refine_field(ctx, id, key, value)?;
        } else {
            create_field(ctx, id, key, value, false)?;
        }
    }
    Ok(())
}

/// Count one more observation of an existing field. Attributes are re-typed
/// and widen to String on conflict; references are treated as always
/// compatible.
fn refine_field(
    ctx: &mut DiscoveryContext<'_>,
    class_id: &str,
    name: &str,
    value: &Value,
) -> Result<()> {
    let field = ctx.field_mut(class_id, name)?;
    field.record_occurrence();
    if field.is_reference() {
        return Ok(());
    }

    let resolved = resolve_type(ctx, name, value)?;
    let field = ctx.field_mut(class_id, name)?;
    if field.value_type() != &resolved {
        if field.degrade_to_string() {
            debug!(
                class = class_id,
                field = name,
                "Attribute typed to String due to conflicts"
            );
        }
    } else {
        trace!(class = class_id, field = name, "No conflicts with attribute");
    }
    Ok(())
}

/// Type `value` and add it to class `class_id` as a new field.
///
/// Fails if the class is unknown or already has a field called `name`.
/// Resolving the value may itself refine `class_id` (an object nested under a
/// field that digests back to its own class); a field of the same name added
/// that way is refined with this observation instead of duplicated.
pub fn create_field(
    ctx: &mut DiscoveryContext<'_>,
    class_id: &str,
    name: &str,
    value: &Value,
    required: bool,
) -> Result<()> {
    if ctx.class_mut(class_id)?.has_field(name) {
        return Err(DiscoveryError::invalid(format!(
            "field {} already exists in class {}",
            name, class_id
        )));
    }

    let value_type = resolve_type(ctx, name, value)?;
    let multiplicity = if value.is_array() {
        Multiplicity::Many
    } else {
        Multiplicity::One
    };

    let class = ctx.class_mut(class_id)?;
    if let Some(field) = class.field_mut(name) {
        field.record_occurrence();
        if required {
            field.mark_required();
        }
        if field.is_attribute() && field.value_type() != &value_type {
            field.degrade_to_string();
        }
        debug!(
            class = class_id,
            field = name,
            "Field introduced while typing its own value, refined instead"
        );
        return Ok(());
    }

    let field = FieldDef::new(name, value_type, multiplicity, required);
    trace!(
        class = class_id,
        field = name,
        kind = ?field.kind(),
        value_type = field.value_type().type_name(),
        required,
        "Field created"
    );
    class.push_field(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::digest::PluralStripDigester;
    use crate::discovery::types::{PrimitiveKind, ResolvedType};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_create_marks_fields_required() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);

        discover_class(&mut ctx, "Order", &object(json!({"sku": "BL394D", "quantity": 4})))
            .unwrap();

        let class = registry.get("Order").unwrap();
        assert_eq!(class.occurrence_count(), 1);
        let names: Vec<&str> = class.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["sku", "quantity"]);
        assert!(class.fields().iter().all(|f| f.required()));
        assert_eq!(
            class.field("quantity").unwrap().value_type(),
            &ResolvedType::Primitive(PrimitiveKind::Integer)
        );
    }

    #[test]
    fn test_refinement_keeps_first_instance_snapshot() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);

        discover_class(&mut ctx, "Thing", &object(json!({"a": 1, "b": "x"}))).unwrap();
        discover_class(&mut ctx, "Thing", &object(json!({"a": 2, "c": true}))).unwrap();

        let class = registry.get("Thing").unwrap();
        assert_eq!(class.occurrence_count(), 2);

        let a = class.field("a").unwrap();
        assert!(a.required());
        assert_eq!(a.occurrence_count(), 2);

        let b = class.field("b").unwrap();
        assert!(b.required());
        assert_eq!(b.occurrence_count(), 1);

        let c = class.field("c").unwrap();
        assert!(!c.required());
        assert_eq!(c.occurrence_count(), 1);
    }

    #[test]
    fn test_conflicting_attribute_degrades_to_string() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);

        discover_class(&mut ctx, "Reading", &object(json!({"value": 42}))).unwrap();
        discover_class(&mut ctx, "Reading", &object(json!({"value": true}))).unwrap();
        discover_class(&mut ctx, "Reading", &object(json!({"value": 7}))).unwrap();

        let field = registry.get("Reading").unwrap().field("value").unwrap();
        assert_eq!(field.value_type(), &ResolvedType::STRING);
        assert!(field.is_attribute());
        assert_eq!(field.occurrence_count(), 3);
    }

    #[test]
    fn test_references_are_not_revisited_on_refinement() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);

        discover_class(&mut ctx, "Invoice", &object(json!({"billTo": {"given": "Chris"}})))
            .unwrap();
        discover_class(
            &mut ctx,
            "Invoice",
            &object(json!({"billTo": {"given": "Ann", "family": "Lee"}})),
        )
        .unwrap();

        let invoice = registry.get("Invoice").unwrap();
        assert_eq!(invoice.field("billTo").unwrap().occurrence_count(), 2);

        let bill_to = registry.get("BillTo").unwrap();
        assert_eq!(bill_to.occurrence_count(), 1);
        assert!(!bill_to.has_field("family"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);
        assert!(matches!(
            discover_class(&mut ctx, "", &Map::new()),
            Err(DiscoveryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_create_field_rejects_existing_name() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);
        discover_class(&mut ctx, "Order", &object(json!({"sku": "A"}))).unwrap();

        let result = create_field(&mut ctx, "Order", "sku", &json!("B"), false);
        assert!(matches!(result, Err(DiscoveryError::InvalidArgument(_))));
    }

    #[test]
    fn test_create_field_on_unknown_class() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);
        let result = create_field(&mut ctx, "Ghost", "name", &json!("x"), true);
        assert!(matches!(result, Err(DiscoveryError::InvalidArgument(_))));
    }

    #[test]
    fn test_self_nested_class_is_refined_not_duplicated() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);

        discover_class(
            &mut ctx,
            "Comment",
            &object(json!({"text": "top", "comments": [{"text": "reply", "comments": []}]})),
        )
        .unwrap();

        let comment = registry.get("Comment").unwrap();
        assert_eq!(comment.occurrence_count(), 2);
        let comments: Vec<&FieldDef> = comment
            .fields()
            .iter()
            .filter(|f| f.name() == "comments")
            .collect();
        assert_eq!(comments.len(), 1);
        assert!(comments[0].occurrence_count() <= comment.occurrence_count());
    }

    #[test]
    fn test_sibling_added_while_creating_is_refined() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);

        // The nested `id` refines `Id` and adds `name` before the outer
        // instance reaches its own `name`
        discover_class(
            &mut ctx,
            "Record",
            &object(json!({"id": {"id": {"name": "x"}, "name": 5}})),
        )
        .unwrap();

        let id = registry.get("Id").unwrap();
        assert_eq!(id.occurrence_count(), 2);
        let names: Vec<&str> = id.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["name", "id"]);

        let name = id.field("name").unwrap();
        assert!(name.required());
        assert_eq!(name.occurrence_count(), 2);
        assert_eq!(name.value_type(), &ResolvedType::STRING);

        let nested = id.field("id").unwrap();
        assert!(nested.is_reference());
        assert!(nested.required());
        assert_eq!(nested.occurrence_count(), 1);
    }

    #[test]
    fn test_self_nested_field_on_creating_instance_is_required() {
        let mut registry = ClassRegistry::new();
        let mut ctx = DiscoveryContext::new(&mut registry, &PluralStripDigester);

        discover_class(&mut ctx, "Node", &object(json!({"node": {"node": {"leaf": true}}})))
            .unwrap();

        let node_class = registry.get("Node").unwrap();
        assert_eq!(node_class.occurrence_count(), 3);

        let node = node_class.field("node").unwrap();
        assert!(node.is_reference());
        assert!(node.required());
        assert_eq!(node.occurrence_count(), 2);

        assert!(!node_class.field("leaf").unwrap().required());
    }

    #[test]
    fn test_max_depth_aborts() {
        let mut registry = ClassRegistry::new();
        let mut ctx =
            DiscoveryContext::new(&mut registry, &PluralStripDigester).with_max_depth(Some(1));

        let result = discover_class(&mut ctx, "A", &object(json!({"b": {"c": {"d": 1}}})));
        assert_eq!(
            result,
            Err(DiscoveryError::MaxDepthExceeded { depth: 2, max: 1 })
        );
    }
}
