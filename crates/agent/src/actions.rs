//! Action catalog and executor
//!
//! Each action is a typed handler registered under a fixed name together
//! with its description and the JSON Schema of its arguments. Handlers never
//! fail: every problem becomes an `ERROR` outcome.

use crate::decision::ActionSpec;
use crate::state::{ActionCall, ApiUpdate, RunState, StateUpdate, Turn};
use graphmorph_common::{ApiType, GraphmorphError, Verdict};
use graphmorph_discovery::{graphql, openapi, ApiExplorer, GraphqlProbe};
use graphmorph_parser::{GraphqlParser, OpenApiParser, ParseReport};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Names of all registered actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    CheckGraphqlEndpoint,
    CheckOpenapiEndpoint,
    FetchGraphqlSchema,
    FetchOpenapiSpec,
    ParseGraphqlSchema,
    ParseOpenapiSpec,
}

impl ActionName {
    pub const ALL: [ActionName; 6] = [
        ActionName::CheckGraphqlEndpoint,
        ActionName::CheckOpenapiEndpoint,
        ActionName::FetchGraphqlSchema,
        ActionName::FetchOpenapiSpec,
        ActionName::ParseGraphqlSchema,
        ActionName::ParseOpenapiSpec,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionName::CheckGraphqlEndpoint => "check_graphql_endpoint",
            ActionName::CheckOpenapiEndpoint => "check_openapi_endpoint",
            ActionName::FetchGraphqlSchema => "fetch_graphql_schema",
            ActionName::FetchOpenapiSpec => "fetch_openapi_spec",
            ActionName::ParseGraphqlSchema => "parse_graphql_schema",
            ActionName::ParseOpenapiSpec => "parse_openapi_spec",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EndpointArgs {
    /// The GraphQL endpoint URL (e.g. https://api.example.com/graphql)
    pub endpoint: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BaseUrlArgs {
    /// The base URL of the API (e.g. https://api.example.com)
    pub base_url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SpecUrlArgs {
    /// The URL of the OpenAPI specification
    pub spec_url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ParseGraphqlArgs {
    /// Introspection result as JSON text or object; defaults to the fetched schema
    #[serde(default)]
    pub raw_schema_json: Option<Value>,

    /// Name stamped on every entity; defaults to the API name
    #[serde(default)]
    pub source_api: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ParseOpenapiArgs {
    /// OpenAPI/Swagger document as JSON text or object; defaults to the fetched spec
    #[serde(default)]
    pub raw_spec_json: Option<Value>,

    /// Name stamped on every entity; defaults to the API name
    #[serde(default)]
    pub source_api: Option<String>,
}

/// Read-only view handed to handlers
pub struct ActionContext<'a> {
    pub explorer: &'a dyn ApiExplorer,
    pub state: &'a RunState,
}

/// Structured result of one action
///
/// Only `summary` reaches the transcript; entities and the raw payload
/// travel separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub verdict: Verdict,
    pub summary: String,
    pub raw_schema: Option<Value>,
    pub report: Option<ParseReport>,
    pub api: Option<ApiUpdate>,
}

impl ActionOutcome {
    /// Outcome carrying only a result line
    pub fn text(summary: String) -> Self {
        Self {
            verdict: Verdict::of(&summary).unwrap_or(Verdict::Success),
            summary,
            raw_schema: None,
            report: None,
            api: None,
        }
    }

    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self::text(Verdict::Error.line(detail))
    }

    fn with_api(mut self, api_type: ApiType, spec_url: Option<String>) -> Self {
        self.api = Some(ApiUpdate {
            api_type: Some(api_type),
            spec_url,
        });
        self
    }

    /// State changes for the loop to merge; failures are also recorded as errors
    pub fn into_update(self, call_id: &str) -> StateUpdate {
        let errors = if self.verdict == Verdict::Error {
            vec![self.summary.clone()]
        } else {
            Vec::new()
        };

        StateUpdate {
            turns: vec![Turn::tool_result(call_id, self.summary)],
            entities: self.report.map(|r| r.entities).unwrap_or_default(),
            errors,
            raw_schema: self.raw_schema,
            api: self.api,
            status: None,
        }
    }
}

type Handler = fn(&ActionContext<'_>, Value) -> ActionOutcome;

/// One registered action
pub struct ActionDef {
    pub name: ActionName,
    pub description: &'static str,
    input_schema: fn() -> Value,
    handler: Handler,
}

impl ActionDef {
    pub fn spec(&self) -> ActionSpec {
        ActionSpec {
            name: self.name.as_str().to_string(),
            description: self.description.to_string(),
            input_schema: (self.input_schema)(),
        }
    }
}

/// Registry of the actions one loop may use
pub struct ActionCatalog {
    actions: Vec<ActionDef>,
}

impl ActionCatalog {
    /// Discovery and fetch actions
    pub fn export() -> Self {
        Self::with(&[
            ActionName::CheckGraphqlEndpoint,
            ActionName::CheckOpenapiEndpoint,
            ActionName::FetchGraphqlSchema,
            ActionName::FetchOpenapiSpec,
        ])
    }

    /// Parse actions
    pub fn parse() -> Self {
        Self::with(&[ActionName::ParseGraphqlSchema, ActionName::ParseOpenapiSpec])
    }

    /// Every action
    pub fn all() -> Self {
        Self::with(&ActionName::ALL)
    }

    pub fn with(names: &[ActionName]) -> Self {
        Self {
            actions: names.iter().map(|name| definition(*name)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ActionDef> {
        self.actions.iter().find(|def| def.name.as_str() == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|def| def.name.as_str()).collect()
    }

    pub fn specs(&self) -> Vec<ActionSpec> {
        self.actions.iter().map(ActionDef::spec).collect()
    }

    /// Dispatch `call` to its handler
    pub fn execute(&self, ctx: &ActionContext<'_>, call: &ActionCall) -> ActionOutcome {
        let Some(def) = self.get(&call.name) else {
            tracing::warn!(action = %call.name, "unknown action requested");
            return ActionOutcome::error(format!(
                "Unknown action '{}'. Available actions: {}",
                call.name,
                self.names().join(", ")
            ));
        };

        tracing::debug!(action = %def.name, id = %call.id, "dispatching action");
        (def.handler)(ctx, call.arguments.clone())
    }
}

fn definition(name: ActionName) -> ActionDef {
    match name {
        ActionName::CheckGraphqlEndpoint => ActionDef {
            name,
            description: "Check if an endpoint supports GraphQL by attempting introspection. \
                Use this first when analyzing an unknown API.",
            input_schema: input_schema::<EndpointArgs>,
            handler: check_graphql_endpoint,
        },
        ActionName::CheckOpenapiEndpoint => ActionDef {
            name,
            description: "Check if a REST API has an OpenAPI/Swagger specification at one of \
                the common locations. Use this when the GraphQL check returns NO.",
            input_schema: input_schema::<BaseUrlArgs>,
            handler: check_openapi_endpoint,
        },
        ActionName::FetchGraphqlSchema => ActionDef {
            name,
            description: "Fetch the complete GraphQL schema via introspection. Only call this \
                after confirming the endpoint is GraphQL.",
            input_schema: input_schema::<EndpointArgs>,
            handler: fetch_graphql_schema,
        },
        ActionName::FetchOpenapiSpec => ActionDef {
            name,
            description: "Fetch and summarize an OpenAPI specification. Only call this after \
                finding the spec URL with check_openapi_endpoint.",
            input_schema: input_schema::<SpecUrlArgs>,
            handler: fetch_openapi_spec,
        },
        ActionName::ParseGraphqlSchema => ActionDef {
            name,
            description: "Parse a GraphQL introspection result into structured entities.",
            input_schema: input_schema::<ParseGraphqlArgs>,
            handler: parse_graphql_schema,
        },
        ActionName::ParseOpenapiSpec => ActionDef {
            name,
            description: "Parse an OpenAPI/Swagger specification into structured entities.",
            input_schema: input_schema::<ParseOpenapiArgs>,
            handler: parse_openapi_spec,
        },
    }
}

fn input_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

fn arguments<T: DeserializeOwned>(name: ActionName, arguments: Value) -> Result<T, ActionOutcome> {
    serde_json::from_value(arguments)
        .map_err(|e| ActionOutcome::error(format!("Invalid arguments for {}: {}", name, e)))
}

fn check_graphql_endpoint(ctx: &ActionContext<'_>, args: Value) -> ActionOutcome {
    let args: EndpointArgs = match arguments(ActionName::CheckGraphqlEndpoint, args) {
        Ok(args) => args,
        Err(outcome) => return outcome,
    };

    let probe = ctx.explorer.probe_graphql(&args.endpoint);
    let outcome = ActionOutcome::text(probe.summary());
    match probe {
        GraphqlProbe::Confirmed { .. } => outcome.with_api(ApiType::Graphql, None),
        _ => outcome,
    }
}

fn check_openapi_endpoint(ctx: &ActionContext<'_>, args: Value) -> ActionOutcome {
    let args: BaseUrlArgs = match arguments(ActionName::CheckOpenapiEndpoint, args) {
        Ok(args) => args,
        Err(outcome) => return outcome,
    };

    match ctx.explorer.probe_openapi(&args.base_url) {
        Ok(probe) => {
            let outcome = ActionOutcome::text(probe.summary());
            match probe.first() {
                Some(hit) => outcome.with_api(ApiType::Rest, Some(hit.url.clone())),
                None => outcome,
            }
        }
        Err(err) => ActionOutcome::text(openapi::scan_failure_line(&err)),
    }
}

fn fetch_graphql_schema(ctx: &ActionContext<'_>, args: Value) -> ActionOutcome {
    let args: EndpointArgs = match arguments(ActionName::FetchGraphqlSchema, args) {
        Ok(args) => args,
        Err(outcome) => return outcome,
    };

    match ctx.explorer.fetch_graphql_schema(&args.endpoint) {
        Ok(fetched) => ActionOutcome {
            raw_schema: Some(fetched.raw),
            ..ActionOutcome::text(fetched.digest)
        }
        .with_api(ApiType::Graphql, None),
        Err(err) => ActionOutcome::text(graphql::fetch_failure_line(&err)),
    }
}

fn fetch_openapi_spec(ctx: &ActionContext<'_>, args: Value) -> ActionOutcome {
    let args: SpecUrlArgs = match arguments(ActionName::FetchOpenapiSpec, args) {
        Ok(args) => args,
        Err(outcome) => return outcome,
    };

    match ctx.explorer.fetch_openapi_spec(&args.spec_url) {
        Ok(fetched) => ActionOutcome {
            raw_schema: Some(fetched.raw),
            ..ActionOutcome::text(fetched.digest)
        }
        .with_api(ApiType::Rest, Some(args.spec_url)),
        Err(err) => ActionOutcome::text(openapi::fetch_failure_line(&err)),
    }
}

fn parse_graphql_schema(ctx: &ActionContext<'_>, args: Value) -> ActionOutcome {
    let args: ParseGraphqlArgs = match arguments(ActionName::ParseGraphqlSchema, args) {
        Ok(args) => args,
        Err(outcome) => return outcome,
    };
    let source_api = args.source_api.unwrap_or_else(|| ctx.state.api.name.clone());

    let result = match payload(args.raw_schema_json, ctx.state) {
        Some(Value::String(text)) => GraphqlParser::from_json(&text, &source_api),
        Some(value) => GraphqlParser::from_value(&value, &source_api),
        None => return missing_payload(),
    };
    report_outcome(result.and_then(|parser| parser.parse()))
}

fn parse_openapi_spec(ctx: &ActionContext<'_>, args: Value) -> ActionOutcome {
    let args: ParseOpenapiArgs = match arguments(ActionName::ParseOpenapiSpec, args) {
        Ok(args) => args,
        Err(outcome) => return outcome,
    };
    let source_api = args.source_api.unwrap_or_else(|| ctx.state.api.name.clone());

    let result = match payload(args.raw_spec_json, ctx.state) {
        Some(Value::String(text)) => OpenApiParser::from_json(&text, &source_api),
        Some(value) => OpenApiParser::from_value(&value, &source_api),
        None => return missing_payload(),
    };
    report_outcome(result.and_then(|parser| parser.parse()))
}

/// Explicit argument first, then the payload captured by a fetch
fn payload(argument: Option<Value>, state: &RunState) -> Option<Value> {
    argument
        .filter(|value| !value.is_null())
        .or_else(|| state.raw_schema.clone())
}

fn missing_payload() -> ActionOutcome {
    ActionOutcome::error("No schema payload to parse. Fetch a schema first or pass it as an argument.")
}

fn report_outcome(result: graphmorph_common::Result<ParseReport>) -> ActionOutcome {
    match result {
        Ok(report) => {
            let summary = report.summary();
            ActionOutcome {
                report: Some(report),
                ..ActionOutcome::text(summary)
            }
        }
        Err(GraphmorphError::Parse(message)) => ActionOutcome::error(message),
        Err(err) => ActionOutcome::error(err),
    }
}
