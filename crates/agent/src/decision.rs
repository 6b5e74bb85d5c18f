//! Interface to the external decision-maker

use crate::state::Turn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Catalog entry as presented to the decision-maker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    pub description: String,

    /// JSON Schema of the accepted arguments
    pub input_schema: Value,
}

/// Either a final answer or exactly one action to run next
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Finish(String),
    Invoke { name: String, arguments: Value },
}

impl Decision {
    /// Convenience constructor for an action request
    pub fn invoke(name: &str, arguments: Value) -> Self {
        Decision::Invoke {
            name: name.to_string(),
            arguments,
        }
    }
}

/// Failures reported by a decision-maker implementation
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("decision maker failed: {0}")]
    Decision(String),

    #[error("decision maker returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Chooses the next step from the transcript and the available actions
///
/// Implementations are opaque to the orchestrator, typically a language
/// model client. The orchestrator only guarantees that `transcript` holds
/// every turn of the current run in order.
pub trait DecisionMaker {
    fn decide(&self, transcript: &[Turn], actions: &[ActionSpec]) -> Result<Decision, AgentError>;
}
