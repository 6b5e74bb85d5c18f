//! Blocking HTTP plumbing shared by every probe and fetch

use crate::graphql::{self, GraphqlProbe};
use crate::openapi::{self, OpenApiProbe};
use crate::{ApiExplorer, DiscoveryError, FetchedSchema, Result};
use graphmorph_common::HttpConfig;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

/// Status and body of one completed request
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| DiscoveryError::MalformedJson(e.to_string()))
    }
}

/// [`ApiExplorer`] backed by a blocking `reqwest` client
///
/// Every request carries the configured timeout and, when set, the bearer
/// token. Redirects are followed.
pub struct HttpExplorer {
    client: Client,
    timeout_secs: u64,
    parallel_scan: bool,
}

impl HttpExplorer {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| DiscoveryError::Client(format!("invalid bearer token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| DiscoveryError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
            parallel_scan: config.parallel_scan,
        })
    }

    /// POST `{"query": ...}` as JSON
    pub(crate) fn post_query(&self, url: &str, query: &str) -> Result<RawResponse> {
        tracing::debug!(url, "POST graphql query");
        let response = self
            .client
            .post(url)
            .json(&json!({ "query": query }))
            .send()
            .map_err(|e| self.transport_error(url, e))?;
        self.read(url, response)
    }

    pub(crate) fn get(&self, url: &str) -> Result<RawResponse> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.transport_error(url, e))?;
        self.read(url, response)
    }

    fn read(&self, url: &str, response: reqwest::blocking::Response) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.transport_error(url, e))?;
        tracing::debug!(status, bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> DiscoveryError {
        if err.is_timeout() {
            DiscoveryError::Timeout {
                secs: self.timeout_secs,
            }
        } else if err.is_builder() {
            DiscoveryError::InvalidUrl(url.to_string())
        } else {
            DiscoveryError::Transport(err.to_string())
        }
    }

    /// One GET per conventional path; accepted hits and per-path errors in path order
    fn scan_paths(&self, base_url: &str) -> Vec<Result<Option<openapi::SpecLocation>>> {
        let urls = openapi::candidate_urls(base_url);

        let check = |(path, url): &(&'static str, String)| {
            self.get(url)
                .map(|response| openapi::accept_spec(path, url, &response))
        };

        if !self.parallel_scan {
            return urls.iter().map(check).collect();
        }

        std::thread::scope(|scope| {
            let handles: Vec<_> = urls
                .iter()
                .map(|candidate| scope.spawn(move || check(candidate)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(DiscoveryError::Transport("path probe panicked".to_string()))
                    })
                })
                .collect()
        })
    }
}

impl ApiExplorer for HttpExplorer {
    fn probe_graphql(&self, endpoint: &str) -> GraphqlProbe {
        let probe = match self.post_query(endpoint, graphql::PROBE_QUERY) {
            Ok(response) => graphql::classify_probe(&response),
            Err(err) => GraphqlProbe::Failed(err),
        };
        tracing::info!(endpoint, verdict = %probe.verdict(), "graphql probe finished");
        probe
    }

    fn probe_openapi(&self, base_url: &str) -> Result<OpenApiProbe> {
        let results = self.scan_paths(base_url);

        let mut hits = Vec::new();
        let mut first_error = None;
        let mut reached = false;
        for result in results {
            match result {
                Ok(hit) => {
                    reached = true;
                    hits.extend(hit);
                }
                Err(err) => {
                    tracing::debug!(%err, "spec path probe failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        // Only a scan where no path answered at all is a transport failure
        if !reached {
            if let Some(err) = first_error {
                tracing::warn!(base_url, %err, "openapi scan could not reach host");
                return Err(err);
            }
        }

        tracing::info!(base_url, hits = hits.len(), "openapi scan finished");
        Ok(OpenApiProbe { hits })
    }

    fn fetch_graphql_schema(&self, endpoint: &str) -> Result<FetchedSchema> {
        let response = self.post_query(endpoint, graphql::INTROSPECTION_QUERY)?;
        let fetched = graphql::decode_introspection(&response)?;
        tracing::info!(endpoint, "graphql schema fetched");
        Ok(fetched)
    }

    fn fetch_openapi_spec(&self, spec_url: &str) -> Result<FetchedSchema> {
        let response = self.get(spec_url)?;
        let fetched = openapi::decode_spec(&response)?;
        tracing::info!(spec_url, "openapi spec fetched");
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_response_json() {
        let ok = RawResponse {
            status: 200,
            body: r#"{"a": 1}"#.to_string(),
        };
        assert_eq!(ok.json().unwrap()["a"], 1);

        let bad = RawResponse {
            status: 200,
            body: "<html>".to_string(),
        };
        assert!(matches!(bad.json(), Err(DiscoveryError::MalformedJson(_))));
    }

    #[test]
    fn test_invalid_bearer_token_rejected() {
        let config = HttpConfig {
            bearer_token: Some("bad\ntoken".to_string()),
            ..HttpConfig::default()
        };
        assert!(matches!(
            HttpExplorer::new(&config),
            Err(DiscoveryError::Client(_))
        ));
    }

    #[test]
    fn test_invalid_url_is_probe_failure() {
        let explorer = HttpExplorer::new(&HttpConfig::default()).unwrap();
        let probe = explorer.probe_graphql("not a url");
        assert!(matches!(probe, GraphqlProbe::Failed(_)));
        assert!(probe.summary().starts_with("ERROR - "));
    }
}
