//! Converts GraphQL introspection types to SchemaEntity records

use super::types::{FullType, IntrospectionSchema, TypeRef};
use crate::type_mapper::TypeMapper;
use graphmorph_common::{SchemaEntity, SchemaField, ENUM_VALUE};

/// Convert every modelled type of an introspection schema
///
/// Output follows the order of `__schema.types`.
pub fn convert_schema(schema: &IntrospectionSchema, source_api: &str) -> Vec<SchemaEntity> {
    schema
        .types
        .iter()
        .flatten()
        .filter_map(|type_def| convert_type(type_def, source_api))
        .collect()
}

/// Build an entity from one introspection type
///
/// Returns `None` for introspection-internal (`__*`) types and for scalars,
/// which carry no field structure.
pub fn convert_type(type_def: &FullType, source_api: &str) -> Option<SchemaEntity> {
    if type_def.is_introspection_internal() {
        return None;
    }

    let kind = type_def.kind.as_deref().unwrap_or("UNKNOWN");
    if kind == "SCALAR" {
        return None;
    }

    // Objects and interfaces list `fields`; input objects list `inputFields`
    let raw_fields = type_def
        .fields
        .as_deref()
        .filter(|fields| !fields.is_empty())
        .or(type_def.input_fields.as_deref())
        .unwrap_or_default();

    let mut fields: Vec<SchemaField> = raw_fields
        .iter()
        .map(|field| {
            let (field_type, is_required) = field
                .field_type
                .as_ref()
                .map(TypeMapper::unwrap_graphql)
                .unwrap_or_else(|| TypeMapper::unwrap_graphql(&TypeRef::default()));

            SchemaField {
                name: field.name.clone().unwrap_or_else(|| "unknown".to_string()),
                field_type,
                is_required,
                description: field.description.clone(),
            }
        })
        .collect();

    fields.extend(type_def.enum_values.iter().flatten().map(|value| SchemaField {
        name: value.name.clone().unwrap_or_else(|| "unknown".to_string()),
        field_type: ENUM_VALUE.to_string(),
        is_required: true,
        description: value.description.clone(),
    }));

    Some(SchemaEntity {
        name: type_def.name.clone().unwrap_or_default(),
        kind: kind.to_string(),
        description: type_def.description.clone(),
        fields,
        source_api: source_api.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_type(value: serde_json::Value) -> FullType {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_skips_scalars_and_internal_types() {
        let scalar = full_type(json!({"kind": "SCALAR", "name": "String"}));
        assert!(convert_type(&scalar, "api").is_none());

        let internal = full_type(json!({"kind": "OBJECT", "name": "__Type", "fields": []}));
        assert!(convert_type(&internal, "api").is_none());
    }

    #[test]
    fn test_enum_values_become_required_fields() {
        let status = full_type(json!({
            "kind": "ENUM",
            "name": "Status",
            "enumValues": [
                {"name": "ACTIVE", "description": "In use"},
                {"name": "RETIRED", "description": null}
            ]
        }));

        let entity = convert_type(&status, "api").unwrap();
        assert_eq!(entity.kind, "ENUM");
        assert_eq!(entity.fields.len(), 2);
        assert!(entity
            .fields
            .iter()
            .all(|f| f.field_type == ENUM_VALUE && f.is_required));
        assert_eq!(entity.fields[0].description.as_deref(), Some("In use"));
    }

    #[test]
    fn test_input_fields_used_when_fields_absent() {
        let input = full_type(json!({
            "kind": "INPUT_OBJECT",
            "name": "CountryFilter",
            "fields": null,
            "inputFields": [
                {"name": "code", "type": {"kind": "NON_NULL", "name": null,
                    "ofType": {"kind": "SCALAR", "name": "ID", "ofType": null}}}
            ]
        }));

        let entity = convert_type(&input, "countries").unwrap();
        assert_eq!(entity.fields.len(), 1);
        assert_eq!(entity.fields[0].name, "code");
        assert_eq!(entity.fields[0].field_type, "ID");
        assert!(entity.fields[0].is_required);
        assert_eq!(entity.source_api, "countries");
    }

    #[test]
    fn test_missing_field_type_is_unknown() {
        let object = full_type(json!({
            "kind": "OBJECT",
            "name": "Thing",
            "fields": [{"name": "mystery"}]
        }));

        let entity = convert_type(&object, "api").unwrap();
        assert_eq!(entity.fields[0].field_type, "Unknown");
        assert!(!entity.fields[0].is_required);
    }
}
