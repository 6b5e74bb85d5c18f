//! GraphQL endpoint probing and introspection fetch

use crate::client::RawResponse;
use crate::{DiscoveryError, FetchedSchema, Result};
use graphmorph_common::Verdict;
use graphmorph_parser::graphql::{FullType, IntrospectionSchema};
use serde_json::Value;
use std::collections::BTreeMap;

/// Minimal introspection query; any GraphQL server answers it
pub const PROBE_QUERY: &str = "{ __schema { types { name } } }";

/// Full introspection query used by the fetcher
///
/// Type references are unwound four levels deep, enough for
/// `[Type!]!` and one more nesting level.
pub const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      kind
      name
      description
      fields {
        name
        description
        type { ...TypeRef }
      }
      inputFields {
        name
        description
        type { ...TypeRef }
      }
      enumValues {
        name
        description
      }
    }
  }
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
      }
    }
  }
}
"#;

/// Types listed per kind in a fetch digest
const DIGEST_PER_KIND: usize = 10;

/// Characters of a type description shown in a digest
const DIGEST_DESCRIPTION_CHARS: usize = 50;

/// Classification of a probed endpoint
#[derive(Debug)]
pub enum GraphqlProbe {
    /// Introspection answered with a type list
    Confirmed { type_count: usize },

    /// HTTP 200 carrying a GraphQL error envelope
    Ambiguous { message: String },

    /// Any other answer
    NotGraphql { status: u16 },

    /// No usable answer; not a negative classification
    Failed(DiscoveryError),
}

impl GraphqlProbe {
    pub fn verdict(&self) -> Verdict {
        match self {
            GraphqlProbe::Confirmed { .. } => Verdict::Yes,
            GraphqlProbe::Ambiguous { .. } => Verdict::Maybe,
            GraphqlProbe::NotGraphql { .. } => Verdict::No,
            GraphqlProbe::Failed(_) => Verdict::Error,
        }
    }

    pub fn is_graphql(&self) -> bool {
        matches!(self, GraphqlProbe::Confirmed { .. })
    }

    /// One-line result for the transcript
    pub fn summary(&self) -> String {
        let verdict = self.verdict();
        match self {
            GraphqlProbe::Confirmed { type_count } => verdict.line(format!(
                "This is a GraphQL endpoint. Found {} types via introspection.",
                type_count
            )),
            GraphqlProbe::Ambiguous { message } => {
                verdict.line(format!("Endpoint responded but with errors: {}", message))
            }
            GraphqlProbe::NotGraphql { status } => verdict.line(format!(
                "Endpoint returned status {}. Not a GraphQL endpoint.",
                status
            )),
            GraphqlProbe::Failed(DiscoveryError::Timeout { secs }) => {
                verdict.line(format!("Request timed out after {} seconds.", secs))
            }
            GraphqlProbe::Failed(DiscoveryError::Transport(reason)) => {
                verdict.line(format!("Could not connect to endpoint: {}", reason))
            }
            GraphqlProbe::Failed(err) => verdict.line(format!("Unexpected error: {}", err)),
        }
    }
}

/// Classify the answer to [`PROBE_QUERY`]
pub(crate) fn classify_probe(response: &RawResponse) -> GraphqlProbe {
    if response.status != 200 {
        return GraphqlProbe::NotGraphql {
            status: response.status,
        };
    }

    let body = match response.json() {
        Ok(body) => body,
        Err(err) => return GraphqlProbe::Failed(err),
    };

    if let Some(schema) = body.get("data").and_then(|d| d.get("__schema")) {
        return match schema.get("types").and_then(Value::as_array) {
            Some(types) => GraphqlProbe::Confirmed {
                type_count: types.len(),
            },
            None => GraphqlProbe::Failed(DiscoveryError::MissingKey("data.__schema.types")),
        };
    }

    if let Some(errors) = body.get("errors") {
        let message = errors
            .get(0)
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return GraphqlProbe::Ambiguous {
            message: message.to_string(),
        };
    }

    GraphqlProbe::NotGraphql { status: 200 }
}

/// Validate an introspection response and build its digest
pub(crate) fn decode_introspection(response: &RawResponse) -> Result<FetchedSchema> {
    if response.status != 200 {
        return Err(DiscoveryError::Status(response.status));
    }

    let raw = response.json()?;

    if let Some(errors) = raw.get("errors").filter(|e| !e.is_null()) {
        return Err(DiscoveryError::GraphqlErrors(errors.to_string()));
    }

    let schema = raw
        .get("data")
        .and_then(|d| d.get("__schema"))
        .filter(|s| !s.is_null())
        .ok_or(DiscoveryError::MissingKey("data.__schema"))?;

    let schema: IntrospectionSchema = serde_json::from_value(schema.clone())
        .map_err(|e| DiscoveryError::MalformedJson(e.to_string()))?;

    let digest = digest(&schema);
    Ok(FetchedSchema { raw, digest })
}

/// `SUCCESS` digest: user types grouped by kind, ten listed per kind
pub fn digest(schema: &IntrospectionSchema) -> String {
    let user_types: Vec<&FullType> = schema
        .types
        .iter()
        .flatten()
        .filter(|t| !t.is_introspection_internal())
        .collect();

    let mut by_kind: BTreeMap<&str, Vec<&FullType>> = BTreeMap::new();
    for &full_type in &user_types {
        let kind = full_type.kind.as_deref().unwrap_or("UNKNOWN");
        by_kind.entry(kind).or_default().push(full_type);
    }

    let mut lines = vec![
        Verdict::Success.line(format!(
            "Fetched GraphQL schema with {} types.",
            user_types.len()
        )),
        String::new(),
        "Schema summary:".to_string(),
    ];

    for (kind, types) in &by_kind {
        lines.push(String::new());
        lines.push(format!("{} ({}):", kind, types.len()));

        for full_type in types.iter().take(DIGEST_PER_KIND) {
            let description = match full_type.description.as_deref() {
                Some(text) if !text.is_empty() => format!(
                    " - {}...",
                    text.chars()
                        .take(DIGEST_DESCRIPTION_CHARS)
                        .collect::<String>()
                ),
                _ => String::new(),
            };
            lines.push(format!(
                "  • {} ({} fields){}",
                full_type.name.as_deref().unwrap_or_default(),
                full_type.member_count(),
                description
            ));
        }

        if types.len() > DIGEST_PER_KIND {
            lines.push(format!("  ... and {} more", types.len() - DIGEST_PER_KIND));
        }
    }

    lines.join("\n")
}

/// Transcript line for a failed introspection fetch
pub fn fetch_failure_line(err: &DiscoveryError) -> String {
    let detail = match err {
        DiscoveryError::Status(status) => format!("Server returned status {}", status),
        DiscoveryError::GraphqlErrors(errors) => format!("GraphQL errors: {}", errors),
        DiscoveryError::Timeout { secs } => format!("Request timed out after {} seconds.", secs),
        other => format!("Failed to fetch schema: {}", other),
    };
    Verdict::Error.line(detail)
}
