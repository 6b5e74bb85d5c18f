//! OpenAPI spec location scan and document fetch

use crate::client::RawResponse;
use crate::{DiscoveryError, FetchedSchema, Result};
use graphmorph_common::Verdict;
use graphmorph_parser::openapi::{scalar_text, OpenApiDocument, SchemaDefinition};
use serde_json::Value;

/// Conventional spec locations, probed and reported in this order
pub const OPENAPI_PATHS: [&str; 10] = [
    "/openapi.json",
    "/openapi.yaml",
    "/swagger.json",
    "/swagger.yaml",
    "/api-docs",
    "/v3/api-docs",
    "/v2/api-docs",
    "/docs/openapi.json",
    "/.well-known/openapi.json",
    "/api/openapi.json",
];

/// Top-level keys that identify a JSON body as an API description
const SPEC_MARKERS: [&str; 3] = ["openapi", "swagger", "paths"];

const DIGEST_ENDPOINTS: usize = 10;
const DIGEST_SCHEMAS: usize = 15;

/// What identified a spec location as a hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecMarker {
    /// `openapi`/`swagger` value, `unknown` when only `paths` was present
    Version(String),

    /// YAML path answered 200; content not inspected
    Yaml,
}

/// One accepted spec location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLocation {
    pub url: String,
    pub marker: SpecMarker,
}

impl std::fmt::Display for SpecLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.marker {
            SpecMarker::Version(version) => write!(f, "{} (version: {})", self.url, version),
            SpecMarker::Yaml => write!(f, "{} (YAML format)", self.url),
        }
    }
}

/// Result of scanning a base URL; empty `hits` means nothing was found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenApiProbe {
    pub hits: Vec<SpecLocation>,
}

impl OpenApiProbe {
    pub fn verdict(&self) -> Verdict {
        if self.hits.is_empty() {
            Verdict::No
        } else {
            Verdict::Yes
        }
    }

    /// First hit in path order
    pub fn first(&self) -> Option<&SpecLocation> {
        self.hits.first()
    }

    pub fn summary(&self) -> String {
        if self.hits.is_empty() {
            return Verdict::No.line("No OpenAPI specification found at standard locations.");
        }

        let listed: Vec<String> = self.hits.iter().map(|hit| format!("  • {}", hit)).collect();
        Verdict::Yes.line(format!("Found OpenAPI spec at:\n{}", listed.join("\n")))
    }
}

/// Transcript line for a scan that could not reach the host at all
pub fn scan_failure_line(err: &DiscoveryError) -> String {
    Verdict::Error.line(format!("Failed to check for OpenAPI: {}", err))
}

/// Transcript line for a failed document fetch
pub fn fetch_failure_line(err: &DiscoveryError) -> String {
    let detail = match err {
        DiscoveryError::Status(status) => format!("Server returned status {}", status),
        other => format!("Failed to fetch OpenAPI spec: {}", other),
    };
    Verdict::Error.line(detail)
}

/// `(path, url)` for every conventional path under `base_url`
pub(crate) fn candidate_urls(base_url: &str) -> Vec<(&'static str, String)> {
    let base = base_url.trim_end_matches('/');
    OPENAPI_PATHS
        .iter()
        .map(|path| (*path, format!("{}{}", base, path)))
        .collect()
}

/// Decide whether one path answer is a spec location
pub(crate) fn accept_spec(path: &str, url: &str, response: &RawResponse) -> Option<SpecLocation> {
    if response.status != 200 {
        return None;
    }

    let marker = match response.json() {
        Ok(Value::Object(body)) if SPEC_MARKERS.iter().any(|key| body.contains_key(*key)) => {
            let version = ["openapi", "swagger"]
                .iter()
                .filter_map(|key| body.get(*key))
                .find(|value| is_truthy(value))
                .map(scalar_text)
                .unwrap_or_else(|| "unknown".to_string());
            SpecMarker::Version(version)
        }
        // YAML is not parsed; only a non-JSON body can be a YAML document
        Err(_) if path.ends_with(".yaml") => SpecMarker::Yaml,
        _ => return None,
    };

    tracing::debug!(url, ?marker, "spec location accepted");
    Some(SpecLocation {
        url: url.to_string(),
        marker,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Validate a spec download and build its digest
pub(crate) fn decode_spec(response: &RawResponse) -> Result<FetchedSchema> {
    if response.status != 200 {
        return Err(DiscoveryError::Status(response.status));
    }

    let raw = response.json()?;
    if !raw.is_object() {
        return Err(DiscoveryError::MalformedJson(
            "expected a JSON object at the document root".to_string(),
        ));
    }

    let doc: OpenApiDocument = serde_json::from_value(raw.clone())
        .map_err(|e| DiscoveryError::MalformedJson(format!("not an OpenAPI document: {}", e)))?;

    let digest = digest(&doc);
    Ok(FetchedSchema { raw, digest })
}

/// `SUCCESS` digest: title, versions, the first endpoints and schemas
pub fn digest(doc: &OpenApiDocument) -> String {
    let info = doc.info.as_ref();
    let title = info
        .and_then(|i| i.title.as_deref())
        .unwrap_or("Unknown API");
    let version = info
        .and_then(|i| i.version.as_ref())
        .map(scalar_text)
        .unwrap_or_else(|| "unknown".to_string());
    let marker = doc
        .version_marker()
        .unwrap_or_else(|| "unknown".to_string());

    let mut lines = vec![
        Verdict::Success.line(format!(
            "Fetched OpenAPI spec for '{}' (API v{}, OpenAPI {})",
            title, version, marker
        )),
        String::new(),
    ];

    let paths = doc.paths.clone().unwrap_or_default();
    lines.push(format!("Endpoints ({}):", paths.len()));
    for (path, item) in paths.iter().take(DIGEST_ENDPOINTS) {
        let methods: Vec<String> = item
            .as_object()
            .map(|ops| {
                ops.keys()
                    .filter(|key| key.as_str() != "parameters")
                    .map(|key| key.to_uppercase())
                    .collect()
            })
            .unwrap_or_default();
        lines.push(format!("  • {} {}", methods.join(", "), path));
    }
    if paths.len() > DIGEST_ENDPOINTS {
        lines.push(format!(
            "  ... and {} more endpoints",
            paths.len() - DIGEST_ENDPOINTS
        ));
    }

    let schemas = doc.schema_definitions().cloned().unwrap_or_default();
    lines.push(String::new());
    lines.push(format!("Schemas ({}):", schemas.len()));
    for (name, raw_def) in schemas.iter().take(DIGEST_SCHEMAS) {
        let def = SchemaDefinition::from_value(raw_def);
        lines.push(format!(
            "  • {} ({}, {} properties)",
            name,
            def.type_name().unwrap_or("object"),
            def.property_count()
        ));
    }
    if schemas.len() > DIGEST_SCHEMAS {
        lines.push(format!(
            "  ... and {} more schemas",
            schemas.len() - DIGEST_SCHEMAS
        ));
    }

    lines.join("\n")
}
