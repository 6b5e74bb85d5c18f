//! Schema normalization for GraphMorph
//!
//! This crate turns machine-readable API descriptions into the
//! source-agnostic entity model (`SchemaEntity` / `SchemaField`).
//!
//! ## Supported formats
//! - GraphQL introspection results (`graphql` module)
//! - OpenAPI 3.x and Swagger 2.0 documents (`openapi` module)
//!
//! Both go through [`TypeMapper`] so a list of pets is `[Pet]` whichever
//! format it came from.

pub mod graphql;
pub mod openapi;
mod report;
mod type_mapper;

pub use graphql::GraphqlParser;
pub use openapi::OpenApiParser;
pub use report::{extract_entities, ParseReport, SchemaFormat, ENTITIES_SENTINEL};
pub use type_mapper::{TypeMapper, UNKNOWN_TYPE};

use graphmorph_common::{GraphmorphError, Result};
use serde_json::Value;

/// Guess the description format of a decoded payload
///
/// OpenAPI markers (`openapi`, `swagger`, `paths`, `components`,
/// `definitions`) are checked before GraphQL ones (`data`, `__schema`,
/// `types`).
pub fn detect_format(value: &Value) -> Option<SchemaFormat> {
    const OPENAPI_KEYS: [&str; 5] = ["openapi", "swagger", "paths", "components", "definitions"];
    const GRAPHQL_KEYS: [&str; 3] = ["data", "__schema", "types"];

    let object = value.as_object()?;
    if OPENAPI_KEYS.iter().any(|key| object.contains_key(*key)) {
        Some(SchemaFormat::Openapi)
    } else if GRAPHQL_KEYS.iter().any(|key| object.contains_key(*key)) {
        Some(SchemaFormat::Graphql)
    } else {
        None
    }
}

/// Parse a decoded payload into entities
///
/// # Arguments
/// * `value` - GraphQL introspection result or OpenAPI document
/// * `source_api` - Name stamped on every entity
/// * `format` - Explicit format, detected from content when `None`
pub fn parse_schema(
    value: &Value,
    source_api: &str,
    format: Option<SchemaFormat>,
) -> Result<ParseReport> {
    let format = format.or_else(|| detect_format(value)).ok_or_else(|| {
        GraphmorphError::Parse("Could not detect schema format".to_string())
    })?;

    match format {
        SchemaFormat::Graphql => GraphqlParser::from_value(value, source_api)?.parse(),
        SchemaFormat::Openapi => OpenApiParser::from_value(value, source_api)?.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(&json!({"swagger": "2.0"})),
            Some(SchemaFormat::Openapi)
        );
        assert_eq!(
            detect_format(&json!({"data": {"__schema": {}}})),
            Some(SchemaFormat::Graphql)
        );
        assert_eq!(detect_format(&json!({"hello": 1})), None);
        assert_eq!(detect_format(&json!([1, 2])), None);
    }

    #[test]
    fn test_parse_schema_detects_format() {
        let value = json!({"definitions": {"Pet": {"type": "object"}}});
        let report = parse_schema(&value, "petstore", None).unwrap();
        assert_eq!(report.format, SchemaFormat::Openapi);
        assert_eq!(report.entities[0].name, "Pet");

        let err = parse_schema(&json!({}), "x", None).unwrap_err();
        assert!(err.to_string().contains("Could not detect"));
    }
}
