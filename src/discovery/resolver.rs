//! Type resolution for document values
//!
//! Resolving an object-valued field discovers (or refines) the class it
//! digests to, so typing and schema construction happen in the same pass.

use serde_json::Value;
use tracing::trace;

use super::discoverer::{DiscoveryContext, discover_class};
use super::error::{DiscoveryError, Result};
use super::types::{PrimitiveKind, ResolvedType};

/// Resolve the type of `value` observed under `field_name`.
///
/// - strings are `String`, numbers are `Integer`, booleans are `Boolean`
/// - objects become the class `digest(field_name)`
/// - non-empty arrays take the type of their elements, resolved under
///   `digest(field_name)`; elements of different types make the whole field
///   `String`
/// - everything else, including `null` and empty arrays, is `String`
pub fn resolve_type(
    ctx: &mut DiscoveryContext<'_>,
    field_name: &str,
    value: &Value,
) -> Result<ResolvedType> {
    if field_name.is_empty() {
        return Err(DiscoveryError::invalid("field name cannot be empty"));
    }

    match value {
        Value::String(_) => Ok(ResolvedType::Primitive(PrimitiveKind::String)),
        Value::Number(_) => Ok(ResolvedType::Primitive(PrimitiveKind::Integer)),
        Value::Bool(_) => Ok(ResolvedType::Primitive(PrimitiveKind::Boolean)),
        Value::Array(items) if !items.is_empty() => {
            ctx.nested(|ctx| resolve_array(ctx, field_name, items))
        }
        Value::Object(object) => {
            let id = ctx.digest(field_name)?;
            let id = ctx.nested(|ctx| discover_class(ctx, &id, object))?;
            Ok(ResolvedType::Class(id))
        }
        _ => {
            trace!(field = field_name, "Type not discovered, using String");
            Ok(ResolvedType::STRING)
        }
    }
}

fn resolve_array(
    ctx: &mut DiscoveryContext<'_>,
    field_name: &str,
    items: &[Value],
) -> Result<ResolvedType> {
    let element_name = ctx.digest(field_name)?;

    let Some((first, rest)) = items.split_first() else {
        return Ok(ResolvedType::STRING);
    };

    let general = resolve_type(ctx, &element_name, first)?;
    for item in rest {
        let item_type = resolve_type(ctx, &element_name, item)?;
        if item_type != general {
            trace!(field = field_name, "Array holds mixed types, using String");
            return Ok(ResolvedType::STRING);
        }
    }
    Ok(general)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::digest::PluralStripDigester;
    use crate::discovery::registry::ClassRegistry;
    use serde_json::json;

    fn resolve(registry: &mut ClassRegistry, name: &str, value: Value) -> Result<ResolvedType> {
        let mut ctx = DiscoveryContext::new(registry, &PluralStripDigester);
        resolve_type(&mut ctx, name, &value)
    }

    #[test]
    fn test_scalars() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            resolve(&mut registry, "sku", json!("BL394D")).unwrap(),
            ResolvedType::Primitive(PrimitiveKind::String)
        );
        assert_eq!(
            resolve(&mut registry, "quantity", json!(4)).unwrap(),
            ResolvedType::Primitive(PrimitiveKind::Integer)
        );
        assert_eq!(
            resolve(&mut registry, "married", json!(true)).unwrap(),
            ResolvedType::Primitive(PrimitiveKind::Boolean)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_decimals_resolve_to_integer() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            resolve(&mut registry, "price", json!(2392.00)).unwrap(),
            ResolvedType::Primitive(PrimitiveKind::Integer)
        );
        assert_eq!(
            resolve(&mut registry, "tax", json!(-251.42)).unwrap(),
            ResolvedType::Primitive(PrimitiveKind::Integer)
        );
    }

    #[test]
    fn test_null_and_empty_array_fall_back_to_string() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            resolve(&mut registry, "nickname", Value::Null).unwrap(),
            ResolvedType::STRING
        );
        assert_eq!(
            resolve(&mut registry, "tags", json!([])).unwrap(),
            ResolvedType::STRING
        );
    }

    #[test]
    fn test_homogeneous_array_takes_element_type() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            resolve(&mut registry, "counts", json!([1, 2, 3])).unwrap(),
            ResolvedType::Primitive(PrimitiveKind::Integer)
        );
    }

    #[test]
    fn test_mixed_array_is_string() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            resolve(&mut registry, "values", json!([1, "a"])).unwrap(),
            ResolvedType::STRING
        );
        assert_eq!(
            resolve(&mut registry, "values", json!([{"a": 1}, 2])).unwrap(),
            ResolvedType::STRING
        );
    }

    #[test]
    fn test_object_discovers_class() {
        let mut registry = ClassRegistry::new();
        let resolved =
            resolve(&mut registry, "billTo", json!({"given": "Chris", "family": "Dumars"}))
                .unwrap();
        assert_eq!(resolved, ResolvedType::Class("BillTo".to_string()));

        let class = registry.get("BillTo").unwrap();
        assert_eq!(class.fields().len(), 2);
    }

    #[test]
    fn test_array_of_objects_shares_one_class() {
        let mut registry = ClassRegistry::new();
        let resolved = resolve(
            &mut registry,
            "products",
            json!([{"sku": "BL394D"}, {"sku": "BL4438H", "price": 2392.0}]),
        )
        .unwrap();
        assert_eq!(resolved, ResolvedType::Class("Product".to_string()));

        let product = registry.get("Product").unwrap();
        assert_eq!(product.occurrence_count(), 2);
        assert!(!product.field("price").unwrap().required());
    }

    #[test]
    fn test_array_elements_use_digested_name() {
        // Element objects are named after the digest of the digest
        let mut registry = ClassRegistry::new();
        let resolved = resolve(&mut registry, "glass", json!([{"volume": 1}])).unwrap();
        assert_eq!(resolved, ResolvedType::Class("Gla".to_string()));
    }

    #[test]
    fn test_mixed_array_stops_at_first_mismatch() {
        let mut registry = ClassRegistry::new();
        let resolved = resolve(&mut registry, "entries", json!([1, "two", {"three": 3}])).unwrap();
        assert_eq!(resolved, ResolvedType::STRING);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let mut registry = ClassRegistry::new();
        assert!(matches!(
            resolve(&mut registry, "", json!("x")),
            Err(DiscoveryError::InvalidArgument(_))
        ));
    }
}
