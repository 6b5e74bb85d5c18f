//! Converts OpenAPI schema definitions to SchemaEntity records

use super::types::{scalar_text, OpenApiDocument, PropertySchema, SchemaDefinition};
use crate::type_mapper::TypeMapper;
use graphmorph_common::{kind, SchemaEntity, SchemaField, ENUM_VALUE};
use std::collections::HashSet;

/// Convert every named schema of a document, in declaration order
pub fn convert_document(doc: &OpenApiDocument, source_api: &str) -> Vec<SchemaEntity> {
    doc.schema_definitions()
        .into_iter()
        .flatten()
        .map(|(name, value)| {
            convert_schema(name, &SchemaDefinition::from_value(value), source_api)
        })
        .collect()
}

/// Classify a schema definition
///
/// `enum` wins, then an explicit `object` type or a `properties` map, then
/// `allOf`. Anything else is an `OBJECT`.
pub fn classify(schema: &SchemaDefinition) -> &'static str {
    if schema.enum_values.is_some() {
        kind::ENUM
    } else if schema.type_name() == Some("object") || schema.properties.is_some() {
        kind::OBJECT
    } else if schema.all_of.is_some() {
        kind::COMPOSITE
    } else {
        kind::OBJECT
    }
}

/// Build an entity from one named schema definition
///
/// Required-ness comes from the schema's `required` list, never from the
/// property itself. Enum schemas get one `ENUM_VALUE` field per value.
pub fn convert_schema(name: &str, schema: &SchemaDefinition, source_api: &str) -> SchemaEntity {
    let required: HashSet<&str> = schema.required.iter().map(String::as_str).collect();

    let mut fields: Vec<SchemaField> = schema
        .properties
        .iter()
        .flatten()
        .map(|(prop_name, prop_value)| {
            let prop = PropertySchema::from_value(prop_value);
            SchemaField {
                name: prop_name.clone(),
                field_type: TypeMapper::openapi_type(&prop),
                is_required: required.contains(prop_name.as_str()),
                description: prop.description,
            }
        })
        .collect();

    fields.extend(schema.enum_values.iter().flatten().map(|value| SchemaField {
        name: scalar_text(value),
        field_type: ENUM_VALUE.to_string(),
        is_required: true,
        description: None,
    }));

    SchemaEntity {
        name: name.to_string(),
        kind: classify(schema).to_string(),
        description: schema.description.clone(),
        fields,
        source_api: source_api.to_string(),
    }
}
