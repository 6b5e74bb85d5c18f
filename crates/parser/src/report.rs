//! Parse results and their text renderings
//!
//! A [`ParseReport`] keeps the human-readable summary and the entity payload
//! apart. The plain-text interchange form appends the entities after a
//! sentinel line; [`extract_entities`] reads them back.

use graphmorph_common::{GraphmorphError, Result, SchemaEntity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line separating the summary from the JSON entity payload
pub const ENTITIES_SENTINEL: &str = "---ENTITIES_JSON---";

/// Entities listed per kind in a summary
const SUMMARY_PER_KIND: usize = 5;

/// Source description format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    Graphql,
    Openapi,
}

impl std::fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaFormat::Graphql => write!(f, "GraphQL"),
            SchemaFormat::Openapi => write!(f, "OpenAPI"),
        }
    }
}

/// Outcome of parsing one schema payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    pub format: SchemaFormat,
    pub source_api: String,
    pub entities: Vec<SchemaEntity>,
}

impl ParseReport {
    pub fn new(format: SchemaFormat, source_api: &str, entities: Vec<SchemaEntity>) -> Self {
        Self {
            format,
            source_api: source_api.to_string(),
            entities,
        }
    }

    /// `SUCCESS`-prefixed summary grouped by kind
    pub fn summary(&self) -> String {
        let header = match self.format {
            SchemaFormat::Graphql => format!(
                "SUCCESS - Parsed {} entities from GraphQL schema for '{}'.",
                self.entities.len(),
                self.source_api
            ),
            SchemaFormat::Openapi => format!(
                "SUCCESS - Parsed {} entities from OpenAPI spec '{}'",
                self.entities.len(),
                self.source_api
            ),
        };

        let mut lines = vec![header, String::new()];

        for (kind, entities) in self.by_kind() {
            lines.push(format!("{} ({}):", kind, entities.len()));
            for entity in entities.iter().take(SUMMARY_PER_KIND) {
                lines.push(format!(
                    "  • {} - {} fields",
                    entity.name,
                    entity.fields.len()
                ));
            }
            if entities.len() > SUMMARY_PER_KIND {
                lines.push(format!(
                    "  ... and {} more",
                    entities.len() - SUMMARY_PER_KIND
                ));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }

    /// Summary followed by the sentinel line and the entities as JSON
    pub fn to_transcript_text(&self) -> Result<String> {
        let payload = serde_json::to_string_pretty(&self.entities)?;
        Ok(format!("{}\n{}\n{}", self.summary(), ENTITIES_SENTINEL, payload))
    }

    /// Entities grouped by kind, kinds sorted, declaration order kept within a kind
    pub fn by_kind(&self) -> BTreeMap<&str, Vec<&SchemaEntity>> {
        let mut groups: BTreeMap<&str, Vec<&SchemaEntity>> = BTreeMap::new();
        for entity in &self.entities {
            groups.entry(entity.kind.as_str()).or_default().push(entity);
        }
        groups
    }
}

/// Read the entity payload back out of a transcript text
///
/// The payload starts after the last line consisting of the sentinel alone.
/// Pretty-printed JSON never contains such a line.
pub fn extract_entities(text: &str) -> Result<Vec<SchemaEntity>> {
    let marker = format!("\n{}\n", ENTITIES_SENTINEL);
    let (_, payload) = text.rsplit_once(marker.as_str()).ok_or_else(|| {
        GraphmorphError::Parse(format!("no {} marker in text", ENTITIES_SENTINEL))
    })?;

    serde_json::from_str(payload.trim())
        .map_err(|e| GraphmorphError::Parse(format!("Invalid entity payload: {}", e)))
}
