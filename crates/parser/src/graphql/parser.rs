//! GraphQL introspection result parser

use super::types::IntrospectionSchema;
use crate::report::{ParseReport, SchemaFormat};
use graphmorph_common::{GraphmorphError, Result};
use serde_json::Value;

/// GraphQL introspection parser
///
/// Accepts a full response (`{"data": {"__schema": ...}}`), a bare
/// `{"__schema": ...}` object or the schema object itself.
pub struct GraphqlParser {
    /// Loaded `__schema` object
    schema: IntrospectionSchema,

    /// Name stamped on every produced entity
    source_api: String,
}

impl GraphqlParser {
    /// Parse an introspection result from a JSON string
    pub fn from_json(json: &str, source_api: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| GraphmorphError::Parse(format!("Invalid JSON: {}", e)))?;

        Self::from_value(&value, source_api)
    }

    /// Parse an introspection result from an already decoded value
    pub fn from_value(value: &Value, source_api: &str) -> Result<Self> {
        let schema = match locate_schema(value) {
            Some(schema) => serde_json::from_value(schema.clone()).map_err(|e| {
                GraphmorphError::Parse(format!("Failed to parse GraphQL schema: {}", e))
            })?,
            None => IntrospectionSchema::default(),
        };

        Ok(Self {
            schema,
            source_api: source_api.to_string(),
        })
    }

    /// Normalize all modelled types into entities
    pub fn parse(&self) -> Result<ParseReport> {
        if self.schema.types.as_ref().map_or(true, Vec::is_empty) {
            return Err(GraphmorphError::Parse(
                "No types found in GraphQL schema. Is this a valid GraphQL introspection result?"
                    .to_string(),
            ));
        }

        let entities = super::converter::convert_schema(&self.schema, &self.source_api);
        Ok(ParseReport::new(
            SchemaFormat::Graphql,
            &self.source_api,
            entities,
        ))
    }

    /// Get reference to the underlying schema
    pub fn schema(&self) -> &IntrospectionSchema {
        &self.schema
    }
}

/// Find the `__schema` object inside the supported payload shapes
fn locate_schema(value: &Value) -> Option<&Value> {
    let schema = match value.get("data") {
        Some(data) => data.get("__schema")?,
        None => value.get("__schema").unwrap_or(value),
    };
    (!schema.is_null()).then_some(schema)
}
