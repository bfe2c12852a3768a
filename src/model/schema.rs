use serde_json::Value;

use super::types::{FieldModel, RecordModel, RustType, TypeDecl};
use crate::errors::ModelError;
use crate::registry::{camel_ident, field_ident, EntityKind, Identifier, IdentifierRegistry};

/// Where a schema came from, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    pub channel: &'a str,
    pub message: &'a str,
}

impl<'a> SchemaContext<'a> {
    fn unsupported(&self, detail: impl Into<String>) -> ModelError {
        ModelError::UnsupportedShape {
            channel: self.channel.to_string(),
            message: self.message.to_string(),
            detail: detail.into(),
        }
    }

    fn circular(&self, through: &str) -> ModelError {
        ModelError::CircularSchema {
            channel: self.channel.to_string(),
            message: self.message.to_string(),
            through: through.to_string(),
        }
    }
}

/// Simplify an object schema into a record, collecting nested records.
///
/// `candidate` is the preferred type name, `logical` the stable registry
/// key for this schema. The returned identifier is the record's registered
/// name; the record itself (and every nested record it pulls in) is pushed
/// into `collected` exactly once.
pub fn simplify_record(
    schema: &Value,
    candidate: &str,
    logical: &str,
    ctx: &SchemaContext,
    registry: &mut IdentifierRegistry,
    collected: &mut Vec<TypeDecl>,
) -> Result<Identifier, ModelError> {
    if let Some(through) = schema.get("x-circular-ref").and_then(|v| v.as_str()) {
        return Err(ctx.circular(through));
    }

    let is_object = schema.get("type").and_then(|t| t.as_str()) == Some("object")
        || schema.get("properties").is_some();
    if !is_object {
        let shape = schema
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("untyped");
        return Err(ctx.unsupported(format!(
            "top-level payload must be an object, got `{shape}`"
        )));
    }
    if schema.get("additionalProperties").map(|v| v != &Value::Bool(false)) == Some(true) {
        return Err(ctx.unsupported("open additionalProperties maps are not supported"));
    }

    let ident = registry.reserve(EntityKind::Message, logical, candidate);
    if collected.iter().any(|t| t.ident() == &ident) {
        // Shared component schema already simplified under the same name.
        return Ok(ident);
    }
    // Reserve the slot before descending so mutually nested records keep
    // first-seen order.
    let slot = collected.len();
    collected.push(TypeDecl::Record(RecordModel {
        ident: ident.clone(),
        fields: Vec::new(),
    }));

    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let mut fields = Vec::new();
    if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
        for (key, prop) in props {
            let ty = field_type(
                prop,
                key,
                &format!("{logical}/{key}"),
                ctx,
                registry,
                collected,
            )?;
            fields.push(FieldModel {
                name: field_ident(key),
                original_name: key.clone(),
                ty,
                optional: !required.contains(&key.as_str()),
            });
        }
    }

    collected[slot] = TypeDecl::Record(RecordModel {
        ident: ident.clone(),
        fields,
    });
    Ok(ident)
}

/// Map one property schema to a Rust type, recursing into nested objects.
fn field_type(
    prop: &Value,
    key: &str,
    logical: &str,
    ctx: &SchemaContext,
    registry: &mut IdentifierRegistry,
    collected: &mut Vec<TypeDecl>,
) -> Result<RustType, ModelError> {
    if let Some(through) = prop.get("x-circular-ref").and_then(|v| v.as_str()) {
        return Err(ctx.circular(through));
    }
    if prop.get("oneOf").is_some() || prop.get("anyOf").is_some() || prop.get("allOf").is_some() {
        return Err(ctx.unsupported(format!(
            "property `{key}`: schema composition is only supported as alternative messages on an operation"
        )));
    }

    match prop.get("type").and_then(|t| t.as_str()) {
        Some("string") => Ok(RustType::String),
        Some("boolean") => Ok(RustType::Bool),
        Some("integer") => Ok(match prop.get("format").and_then(|f| f.as_str()) {
            Some("int32") => RustType::I32,
            _ => RustType::I64,
        }),
        Some("number") => Ok(match prop.get("format").and_then(|f| f.as_str()) {
            Some("float") => RustType::F32,
            _ => RustType::F64,
        }),
        Some("array") => {
            let items = prop
                .get("items")
                .ok_or_else(|| ModelError::UntypedArrayItems {
                    channel: ctx.channel.to_string(),
                    message: ctx.message.to_string(),
                })?;
            let inner = field_type(items, key, &format!("{logical}/items"), ctx, registry, collected)?;
            Ok(RustType::Vec(Box::new(inner)))
        }
        Some("object") => {
            let (candidate, logical_key) = nested_naming(prop, key, logical);
            let ident =
                simplify_record(prop, &candidate, &logical_key, ctx, registry, collected)?;
            Ok(RustType::Named(ident))
        }
        Some(other) => Err(ctx.unsupported(format!("property `{key}` has unsupported type `{other}`"))),
        None => {
            if prop.get("properties").is_some() {
                let (candidate, logical_key) = nested_naming(prop, key, logical);
                let ident =
                    simplify_record(prop, &candidate, &logical_key, ctx, registry, collected)?;
                Ok(RustType::Named(ident))
            } else {
                Err(ctx.unsupported(format!("property `{key}` declares no type")))
            }
        }
    }
}

/// Name a nested record: after the referenced component when the schema was
/// inlined from one, after the property key otherwise.
fn nested_naming(prop: &Value, key: &str, logical: &str) -> (String, String) {
    match prop.get("x-ref-name").and_then(|v| v.as_str()) {
        Some(ref_name) => (camel_ident(ref_name), format!("component:{ref_name}")),
        None => (camel_ident(key), logical.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> SchemaContext<'static> {
        SchemaContext {
            channel: "test.channel",
            message: "TestMessage",
        }
    }

    #[test]
    fn object_with_primitives_becomes_record() {
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "integer" },
                "note": { "type": "string" },
                "ratio": { "type": "number", "format": "float" }
            }
        });
        let mut registry = IdentifierRegistry::new();
        let mut collected = Vec::new();
        let ident = simplify_record(
            &schema,
            "OrderCreated",
            "m:test",
            &ctx(),
            &mut registry,
            &mut collected,
        )
        .unwrap();
        assert_eq!(ident.as_str(), "OrderCreated");
        let TypeDecl::Record(record) = &collected[0] else {
            panic!("expected record");
        };
        assert_eq!(record.fields.len(), 3);
        assert_eq!(record.fields[0].ty, RustType::I64);
        assert!(!record.fields[0].optional);
        assert!(record.fields[1].optional);
        assert_eq!(record.fields[2].ty, RustType::F32);
    }

    #[test]
    fn nested_object_collects_its_own_record() {
        let schema = json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "object",
                    "properties": { "street": { "type": "string" } }
                }
            }
        });
        let mut registry = IdentifierRegistry::new();
        let mut collected = Vec::new();
        simplify_record(
            &schema,
            "User",
            "m:user",
            &ctx(),
            &mut registry,
            &mut collected,
        )
        .unwrap();
        let names: Vec<&str> = collected.iter().map(|t| t.ident().as_str()).collect();
        assert_eq!(names, ["User", "Address"]);
    }

    #[test]
    fn top_level_primitive_is_rejected() {
        let schema = json!({ "type": "string" });
        let mut registry = IdentifierRegistry::new();
        let mut collected = Vec::new();
        let err = simplify_record(
            &schema,
            "Bad",
            "m:bad",
            &ctx(),
            &mut registry,
            &mut collected,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedShape { .. }));
    }

    #[test]
    fn circular_marker_is_reported_with_context() {
        let schema = json!({
            "type": "object",
            "properties": {
                "next": { "x-circular-ref": "#/components/schemas/Node" }
            }
        });
        let mut registry = IdentifierRegistry::new();
        let mut collected = Vec::new();
        let err = simplify_record(
            &schema,
            "Node",
            "m:node",
            &ctx(),
            &mut registry,
            &mut collected,
        )
        .unwrap_err();
        match err {
            ModelError::CircularSchema { channel, through, .. } => {
                assert_eq!(channel, "test.channel");
                assert_eq!(through, "#/components/schemas/Node");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn array_without_items_is_rejected() {
        let schema = json!({
            "type": "object",
            "properties": { "tags": { "type": "array" } }
        });
        let mut registry = IdentifierRegistry::new();
        let mut collected = Vec::new();
        let err = simplify_record(
            &schema,
            "Tagged",
            "m:tagged",
            &ctx(),
            &mut registry,
            &mut collected,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UntypedArrayItems { .. }));
    }

    #[test]
    fn shared_component_is_simplified_once() {
        let schema = json!({
            "type": "object",
            "properties": {
                "home": { "type": "object", "x-ref-name": "Address",
                          "properties": { "street": { "type": "string" } } },
                "work": { "type": "object", "x-ref-name": "Address",
                          "properties": { "street": { "type": "string" } } }
            }
        });
        let mut registry = IdentifierRegistry::new();
        let mut collected = Vec::new();
        simplify_record(
            &schema,
            "Contact",
            "m:contact",
            &ctx(),
            &mut registry,
            &mut collected,
        )
        .unwrap();
        let addresses = collected
            .iter()
            .filter(|t| t.ident().as_str() == "Address")
            .count();
        assert_eq!(addresses, 1);
    }
}
