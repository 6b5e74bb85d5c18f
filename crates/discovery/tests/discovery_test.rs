//! Integration tests for probes and fetchers against local HTTP servers

use graphmorph_common::{HttpConfig, Verdict};
use graphmorph_discovery::openapi::{fetch_failure_line, scan_failure_line};
use graphmorph_discovery::{
    ApiExplorer, DiscoveryError, GraphqlProbe, HttpExplorer, SpecMarker, PROBE_QUERY,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One observed request: method, path, body, Authorization header
type Seen = (String, String, String, Option<String>);

/// Start a server answering every request with `handler(method, path, body)`
fn serve<F>(handler: F) -> (String, Arc<Mutex<Vec<Seen>>>)
where
    F: Fn(&str, &str, &str) -> (u16, String) + Send + 'static,
{
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    std::thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            let method = request.method().to_string();
            let path = request.url().to_string();
            let auth = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());

            let (status, reply) = handler(&method, &path, &body);
            log.lock().unwrap().push((method, path, body, auth));

            let response = tiny_http::Response::from_string(reply).with_status_code(status);
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{}", port), seen)
}

fn explorer() -> HttpExplorer {
    HttpExplorer::new(&HttpConfig {
        request_timeout_secs: 5,
        ..HttpConfig::default()
    })
    .unwrap()
}

fn introspection_with_types(count: usize) -> Value {
    let types: Vec<Value> = (0..count)
        .map(|i| json!({"kind": "OBJECT", "name": format!("Type{}", i), "fields": []}))
        .collect();
    json!({"data": {"__schema": {"queryType": {"name": "Type0"}, "types": types}}})
}

#[test]
fn test_probe_confirms_graphql_endpoint() {
    let (base, seen) = serve(|method, _, _| {
        if method == "POST" {
            (200, introspection_with_types(15).to_string())
        } else {
            (405, String::new())
        }
    });

    let probe = explorer().probe_graphql(&format!("{}/graphql", base));

    assert!(matches!(probe, GraphqlProbe::Confirmed { type_count: 15 }));
    assert_eq!(probe.verdict(), Verdict::Yes);
    assert!(probe.summary().contains("Found 15 types"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, "/graphql");
    let sent: Value = serde_json::from_str(&seen[0].2).unwrap();
    assert_eq!(sent, json!({ "query": PROBE_QUERY }));
}

#[test]
fn test_probe_reports_rejection_and_errors() {
    let (base, _) = serve(|_, path, _| match path {
        "/locked" => (
            200,
            r#"{"errors":[{"message":"GraphQL introspection is not allowed"}]}"#.to_string(),
        ),
        _ => (404, "not found".to_string()),
    });
    let explorer = explorer();

    let probe = explorer.probe_graphql(&format!("{}/locked", base));
    assert_eq!(
        probe.summary(),
        "MAYBE - Endpoint responded but with errors: GraphQL introspection is not allowed"
    );

    let probe = explorer.probe_graphql(&format!("{}/rest", base));
    assert_eq!(
        probe.summary(),
        "NO - Endpoint returned status 404. Not a GraphQL endpoint."
    );
}

#[test]
fn test_unreachable_endpoint_is_error_not_negative() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        server.server_addr().to_ip().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);
    let explorer = explorer();

    let probe = explorer.probe_graphql(&base);
    assert!(matches!(
        probe,
        GraphqlProbe::Failed(DiscoveryError::Transport(_))
    ));
    assert!(probe
        .summary()
        .starts_with("ERROR - Could not connect to endpoint: "));

    let err = explorer.probe_openapi(&base).unwrap_err();
    assert!(scan_failure_line(&err).starts_with("ERROR - Failed to check for OpenAPI: "));
}

#[test]
fn test_probe_timeout() {
    let (base, _) = serve(|_, _, _| {
        std::thread::sleep(Duration::from_millis(2500));
        (200, introspection_with_types(1).to_string())
    });
    let explorer = HttpExplorer::new(&HttpConfig {
        request_timeout_secs: 1,
        ..HttpConfig::default()
    })
    .unwrap();

    let probe = explorer.probe_graphql(&base);
    assert_eq!(probe.summary(), "ERROR - Request timed out after 1 seconds.");
}

fn spec_only_at_v3(path: &str) -> (u16, String) {
    match path {
        "/v3/api-docs" => (
            200,
            json!({
                "openapi": "3.0.1",
                "info": {"title": "Orders", "version": "1.4.0"},
                "paths": {"/orders": {"get": {}, "post": {}}},
                "components": {"schemas": {"Order": {"type": "object", "properties": {"id": {"type": "integer"}}}}}
            })
            .to_string(),
        ),
        // Landing page served for every unknown route
        "/api-docs" => (200, "<html><body>API docs</body></html>".to_string()),
        "/openapi.json" => (200, r#"{"status":"ok"}"#.to_string()),
        _ => (404, String::new()),
    }
}

#[test]
fn test_openapi_scan_finds_single_location() {
    let (base, seen) = serve(|_, path, _| spec_only_at_v3(path));

    let probe = explorer().probe_openapi(&format!("{}/", base)).unwrap();

    assert_eq!(probe.hits.len(), 1);
    assert_eq!(probe.hits[0].url, format!("{}/v3/api-docs", base));
    assert_eq!(
        probe.hits[0].marker,
        SpecMarker::Version("3.0.1".to_string())
    );
    assert_eq!(
        probe.summary(),
        format!(
            "YES - Found OpenAPI spec at:\n  • {}/v3/api-docs (version: 3.0.1)",
            base
        )
    );
    assert_eq!(seen.lock().unwrap().len(), 10);
}

#[test]
fn test_openapi_scan_ignores_json_catch_all() {
    let (base, _) = serve(|_, path, _| match path {
        "/v3/api-docs" => spec_only_at_v3(path),
        _ => (200, r#"{"status":"ok"}"#.to_string()),
    });

    for parallel_scan in [true, false] {
        let explorer = HttpExplorer::new(&HttpConfig {
            request_timeout_secs: 5,
            parallel_scan,
            ..HttpConfig::default()
        })
        .unwrap();

        let probe = explorer.probe_openapi(&base).unwrap();
        let urls: Vec<&str> = probe.hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, [format!("{}/v3/api-docs", base)]);
    }
}

#[test]
fn test_openapi_scan_merges_in_path_order() {
    let handler = |_: &str, path: &str, _: &str| match path {
        "/swagger.json" => (200, r#"{"swagger":"2.0","paths":{}}"#.to_string()),
        "/openapi.yaml" => (200, "openapi: 3.0.0\n".to_string()),
        "/api/openapi.json" => (200, r#"{"openapi":"3.1.0"}"#.to_string()),
        _ => (404, String::new()),
    };
    let (base, _) = serve(handler);

    for parallel_scan in [true, false] {
        let explorer = HttpExplorer::new(&HttpConfig {
            request_timeout_secs: 5,
            parallel_scan,
            ..HttpConfig::default()
        })
        .unwrap();

        let probe = explorer.probe_openapi(&base).unwrap();
        let urls: Vec<String> = probe.hits.iter().map(|h| h.url.clone()).collect();
        assert_eq!(
            urls,
            [
                format!("{}/openapi.yaml", base),
                format!("{}/swagger.json", base),
                format!("{}/api/openapi.json", base),
            ]
        );
        assert_eq!(probe.hits[0].marker, SpecMarker::Yaml);
    }
}

#[test]
fn test_openapi_scan_without_hits() {
    let (base, _) = serve(|_, _, _| (404, String::new()));
    let probe = explorer().probe_openapi(&base).unwrap();
    assert!(probe.hits.is_empty());
    assert_eq!(probe.verdict(), Verdict::No);
}

#[test]
fn test_fetch_graphql_schema() {
    let (base, seen) = serve(|_, _, _| (200, introspection_with_types(3).to_string()));

    let fetched = explorer().fetch_graphql_schema(&base).unwrap();

    assert_eq!(fetched.raw, introspection_with_types(3));
    assert!(fetched
        .digest
        .starts_with("SUCCESS - Fetched GraphQL schema with 3 types."));
    assert!(fetched.digest.contains("OBJECT (3):"));

    let sent: Value = serde_json::from_str(&seen.lock().unwrap()[0].2).unwrap();
    let query = sent["query"].as_str().unwrap();
    assert!(query.contains("inputFields"));
    assert!(query.contains("enumValues"));
    assert!(query.contains("ofType"));
}

#[test]
fn test_fetch_openapi_spec() {
    let (base, _) = serve(|_, path, _| spec_only_at_v3(path));
    let explorer = explorer();

    let fetched = explorer
        .fetch_openapi_spec(&format!("{}/v3/api-docs", base))
        .unwrap();
    assert_eq!(
        fetched.digest.lines().next().unwrap(),
        "SUCCESS - Fetched OpenAPI spec for 'Orders' (API v1.4.0, OpenAPI 3.0.1)"
    );
    assert!(fetched.digest.contains("  • GET, POST /orders"));
    assert!(fetched.digest.contains("  • Order (object, 1 properties)"));

    let err = explorer
        .fetch_openapi_spec(&format!("{}/missing", base))
        .unwrap_err();
    assert_eq!(fetch_failure_line(&err), "ERROR - Server returned status 404");

    let err = explorer
        .fetch_openapi_spec(&format!("{}/api-docs", base))
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::MalformedJson(_)));
}

#[test]
fn test_repeated_calls_are_stable() {
    let (base, _) = serve(|method, path, _| {
        if method == "POST" {
            (200, introspection_with_types(15).to_string())
        } else {
            spec_only_at_v3(path)
        }
    });
    let explorer = explorer();

    let first = explorer.probe_graphql(&base).summary();
    let second = explorer.probe_graphql(&base).summary();
    assert_eq!(first, second);

    assert_eq!(
        explorer.probe_openapi(&base).unwrap(),
        explorer.probe_openapi(&base).unwrap()
    );
    assert_eq!(
        explorer.fetch_graphql_schema(&base).unwrap(),
        explorer.fetch_graphql_schema(&base).unwrap()
    );
}

#[test]
fn test_bearer_token_is_sent() {
    let (base, seen) = serve(|_, _, _| (200, introspection_with_types(1).to_string()));
    let explorer = HttpExplorer::new(&HttpConfig {
        request_timeout_secs: 5,
        bearer_token: Some("s3cret".to_string()),
        ..HttpConfig::default()
    })
    .unwrap();

    explorer.probe_graphql(&base);
    assert_eq!(
        seen.lock().unwrap()[0].3.as_deref(),
        Some("Bearer s3cret")
    );
}
