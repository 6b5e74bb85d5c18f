//! OpenAPI document parser

use super::types::OpenApiDocument;
use crate::report::{ParseReport, SchemaFormat};
use graphmorph_common::{GraphmorphError, Result};
use serde_json::Value;

/// OpenAPI / Swagger parser
///
/// Reads named schemas from `components.schemas` (3.x) or `definitions`
/// (2.0). Every definition yields exactly one entity.
pub struct OpenApiParser {
    /// Loaded document
    doc: OpenApiDocument,

    /// Name stamped on every produced entity
    source_api: String,
}

impl OpenApiParser {
    /// Parse an OpenAPI document from a JSON string
    pub fn from_json(json: &str, source_api: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| GraphmorphError::Parse(format!("Invalid JSON: {}", e)))?;

        Self::from_value(&value, source_api)
    }

    /// Parse an OpenAPI document from an already decoded value
    pub fn from_value(value: &Value, source_api: &str) -> Result<Self> {
        let doc: OpenApiDocument = serde_json::from_value(value.clone()).map_err(|e| {
            GraphmorphError::Parse(format!("Failed to parse OpenAPI document: {}", e))
        })?;

        Ok(Self {
            doc,
            source_api: source_api.to_string(),
        })
    }

    /// Normalize all named schemas into entities
    pub fn parse(&self) -> Result<ParseReport> {
        if self.doc.schema_definitions().is_none() {
            return Err(GraphmorphError::Parse(
                "No schemas found. Is this a valid OpenAPI/Swagger spec?".to_string(),
            ));
        }

        let entities = super::converter::convert_document(&self.doc, &self.source_api);
        Ok(ParseReport::new(
            SchemaFormat::Openapi,
            &self.source_api,
            entities,
        ))
    }

    /// Get reference to the underlying document
    pub fn doc(&self) -> &OpenApiDocument {
        &self.doc
    }
}
