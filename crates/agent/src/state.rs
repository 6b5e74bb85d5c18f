//! Run state threaded through every orchestration step
//!
//! Components never touch [`RunState`] directly. They return a
//! [`StateUpdate`] and the orchestrator applies it with [`RunState::merge`],
//! which appends accumulating fields in order and never overwrites them.

use graphmorph_common::{ApiInfo, ApiType, SchemaEntity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
    System,
}

/// One action requested by the decision-maker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
    /// Correlates the request with its tool-result turn
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub arguments: Value,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,

    pub content: String,

    /// Set on assistant turns that request an action
    #[serde(default)]
    pub call: Option<ActionCall>,

    /// Set on tool turns: id of the call being answered
    #[serde(default)]
    pub call_id: Option<String>,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            call: None,
            call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Assistant turn carrying an action request
    pub fn action_request(call: ActionCall) -> Self {
        Self {
            call: Some(call),
            ..Self::new(Role::Assistant, "")
        }
    }

    /// Tool-result turn answering `call_id`
    pub fn tool_result(call_id: &str, content: impl Into<String>) -> Self {
        Self {
            call_id: Some(call_id.to_string()),
            ..Self::new(Role::Tool, content)
        }
    }
}

/// Lifecycle tag of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Initialized,
    Exporting,
    Parsing,
    Success,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunStatus::Initialized => "initialized",
            RunStatus::Exporting => "exporting",
            RunStatus::Parsing => "parsing",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Discovery findings about the API under analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiUpdate {
    pub api_type: Option<ApiType>,
    pub spec_url: Option<String>,
}

/// Shared record of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub transcript: Vec<Turn>,

    pub api: ApiInfo,

    /// Last fetched schema payload
    pub raw_schema: Option<Value>,

    pub entities: Vec<SchemaEntity>,

    pub errors: Vec<String>,

    pub status: RunStatus,
}

impl RunState {
    /// Fresh state for `endpoint`; the name defaults to its last path segment
    pub fn new(endpoint: &str, name: Option<&str>) -> Self {
        Self {
            transcript: Vec::new(),
            api: ApiInfo::new(endpoint, name),
            raw_schema: None,
            entities: Vec::new(),
            errors: Vec::new(),
            status: RunStatus::Initialized,
        }
    }

    /// Apply one step's partial update
    ///
    /// Turns, entities and errors are appended in the order given. A
    /// `failed` status is final; later status changes are ignored.
    pub fn merge(&mut self, update: StateUpdate) {
        self.transcript.extend(update.turns);
        self.entities.extend(update.entities);
        self.errors.extend(update.errors);

        if let Some(raw) = update.raw_schema {
            self.raw_schema = Some(raw);
        }

        if let Some(api) = update.api {
            if let Some(api_type) = api.api_type {
                self.api.api_type = api_type;
            }
            if let Some(spec_url) = api.spec_url {
                self.api.spec_url = Some(spec_url);
            }
        }

        if let Some(status) = update.status {
            if self.status != RunStatus::Failed {
                self.status = status;
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }

    /// Content of the last assistant turn without an action request
    pub fn final_answer(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant && t.call.is_none())
            .map(|t| t.content.as_str())
    }
}

/// Partial state produced by one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub turns: Vec<Turn>,
    pub entities: Vec<SchemaEntity>,
    pub errors: Vec<String>,
    pub raw_schema: Option<Value>,
    pub api: Option<ApiUpdate>,
    pub status: Option<RunStatus>,
}

impl StateUpdate {
    pub fn turn(turn: Turn) -> Self {
        Self {
            turns: vec![turn],
            ..Self::default()
        }
    }

    pub fn status(status: RunStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
