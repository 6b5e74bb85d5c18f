//! Common types and utilities for GraphMorph
//!
//! This crate contains the source-agnostic entity model, the shared error
//! type and the layered configuration used across the parser, discovery,
//! agent and CLI components.

mod config;

pub use config::{AgentConfig, GraphmorphConfig, HttpConfig, CONFIG_FILE, ENV_PREFIX};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical field type given to synthesized enum-value fields
pub const ENUM_VALUE: &str = "ENUM_VALUE";

/// Entity kinds produced for OpenAPI schemas
pub mod kind {
    pub const OBJECT: &str = "OBJECT";
    pub const ENUM: &str = "ENUM";
    pub const COMPOSITE: &str = "COMPOSITE";
}

/// Errors that can occur while normalizing schemas or loading configuration
#[derive(Error, Debug)]
pub enum GraphmorphError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for GraphmorphError {
    fn from(err: figment::Error) -> Self {
        GraphmorphError::Config(err.to_string())
    }
}

/// Result type for GraphMorph operations
pub type Result<T> = std::result::Result<T, GraphmorphError>;

/// Kind of API under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    Graphql,
    Rest,
    #[default]
    Unknown,
}

impl std::fmt::Display for ApiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiType::Graphql => write!(f, "graphql"),
            ApiType::Rest => write!(f, "rest"),
            ApiType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Identifies the API analyzed by one workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// Endpoint or base URL given at run start
    pub endpoint: String,

    /// Display name, also used as `source_api` for parsed entities
    pub name: String,

    /// Resolved during discovery
    #[serde(default)]
    pub api_type: ApiType,

    /// Location of the OpenAPI document, once found
    #[serde(default)]
    pub spec_url: Option<String>,
}

impl ApiInfo {
    /// Create API info for an endpoint
    ///
    /// Without an explicit name the last non-empty path segment of the
    /// endpoint is used, e.g. `https://countries.trevorblades.com/graphql`
    /// becomes `graphql`.
    pub fn new(endpoint: &str, name: Option<&str>) -> Self {
        let name = match name {
            Some(name) => name.to_string(),
            None => endpoint
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty())
                .unwrap_or(endpoint)
                .to_string(),
        };

        Self {
            endpoint: endpoint.to_string(),
            name,
            api_type: ApiType::Unknown,
            spec_url: None,
        }
    }
}

/// One normalized field of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,

    /// Canonical type string, lists written as `[Inner]`
    pub field_type: String,

    pub is_required: bool,

    #[serde(default)]
    pub description: Option<String>,
}

/// One normalized schema-level type, object or enum
///
/// Identity is `(name, source_api)`; `fields` keeps declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntity {
    pub name: String,

    /// `OBJECT`, `ENUM`, `COMPOSITE` or a GraphQL introspection kind
    pub kind: String,

    #[serde(default)]
    pub description: Option<String>,

    pub fields: Vec<SchemaField>,

    pub source_api: String,
}

impl SchemaEntity {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Leading word of every action result line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Yes,
    No,
    Maybe,
    Success,
    Error,
}

impl Verdict {
    /// `"<VERDICT> - <detail>"`
    pub fn line(self, detail: impl std::fmt::Display) -> String {
        format!("{} - {}", self, detail)
    }

    /// Recover the verdict from the start of a result text
    pub fn of(text: &str) -> Option<Self> {
        let (head, _) = text.split_once(" - ")?;
        match head {
            "YES" => Some(Verdict::Yes),
            "NO" => Some(Verdict::No),
            "MAYBE" => Some(Verdict::Maybe),
            "SUCCESS" => Some(Verdict::Success),
            "ERROR" => Some(Verdict::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            Verdict::Yes => "YES",
            Verdict::No => "NO",
            Verdict::Maybe => "MAYBE",
            Verdict::Success => "SUCCESS",
            Verdict::Error => "ERROR",
        };
        f.write_str(word)
    }
}
