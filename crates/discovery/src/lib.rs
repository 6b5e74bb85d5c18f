//! Endpoint discovery and schema retrieval
//!
//! Classifies an unknown endpoint as GraphQL or REST-with-OpenAPI and pulls
//! down its machine-readable description together with a short digest.
//!
//! ## Probes
//! - [`GraphqlProbe`]: one minimal introspection query
//! - [`OpenApiProbe`]: GETs against ten conventional spec paths, merged in
//!   path order
//!
//! ## Fetchers
//! Both fetchers return a [`FetchedSchema`]: the raw JSON payload for the
//! parser and a digest for the transcript.
//!
//! ## Usage
//! ```rust,ignore
//! use graphmorph_discovery::{ApiExplorer, HttpExplorer};
//!
//! let explorer = HttpExplorer::new(&config.http)?;
//! let probe = explorer.probe_graphql("https://countries.trevorblades.com/graphql");
//! println!("{}", probe.summary());
//! ```

mod client;
pub mod graphql;
pub mod openapi;

pub use client::HttpExplorer;
pub use graphql::{GraphqlProbe, INTROSPECTION_QUERY, PROBE_QUERY};
pub use openapi::{OpenApiProbe, SpecLocation, SpecMarker, OPENAPI_PATHS};

use serde_json::Value;
use thiserror::Error;

/// Errors raised by probes and fetchers
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("{0}")]
    Transport(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("missing key '{0}' in response")]
    MissingKey(&'static str),

    #[error("{0}")]
    GraphqlErrors(String),

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Raw schema payload plus its human-readable digest
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSchema {
    /// Decoded response body, handed to the parser unchanged
    pub raw: Value,

    /// `SUCCESS`-prefixed summary
    pub digest: String,
}

/// Network-facing discovery operations
///
/// [`HttpExplorer`] is the production implementation; orchestration code
/// only sees this trait.
pub trait ApiExplorer {
    /// Send a minimal introspection query to `endpoint`
    fn probe_graphql(&self, endpoint: &str) -> GraphqlProbe;

    /// Look for an OpenAPI document under the conventional paths of `base_url`
    fn probe_openapi(&self, base_url: &str) -> Result<OpenApiProbe>;

    /// Run the full introspection query against `endpoint`
    fn fetch_graphql_schema(&self, endpoint: &str) -> Result<FetchedSchema>;

    /// Download the OpenAPI document at `spec_url`
    fn fetch_openapi_spec(&self, spec_url: &str) -> Result<FetchedSchema>;
}
