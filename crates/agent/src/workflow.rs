//! Export-then-parse pipeline
//!
//! ```text
//! EXPORT → VALIDATE ─┬─ failed ──────────────────────────→ END
//!                    └─ success → PREPARE_PARSE → PARSE → END
//! ```
//!
//! `EXPORT` and `PARSE` are [`ActionLoop`]s over the export and parse
//! catalogs. The two loops are also available on their own through
//! [`Workflow::export`] and [`Workflow::parse`].

use crate::action_loop::ActionLoop;
use crate::actions::ActionCatalog;
use crate::decision::DecisionMaker;
use crate::state::{RunState, RunStatus, StateUpdate, Turn};
use graphmorph_common::AgentConfig;
use graphmorph_discovery::ApiExplorer;

/// Marker whose presence anywhere in the export transcript fails the run
pub const ERROR_MARKER: &str = "ERROR";

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Export,
    Validate,
    PrepareParse,
    Parse,
    End,
}

/// Entry point for complete runs
pub struct Workflow<'a> {
    config: AgentConfig,
    decider: &'a dyn DecisionMaker,
    explorer: &'a dyn ApiExplorer,
}

impl<'a> Workflow<'a> {
    pub fn new(
        config: &AgentConfig,
        decider: &'a dyn DecisionMaker,
        explorer: &'a dyn ApiExplorer,
    ) -> Self {
        Self {
            config: config.clone(),
            decider,
            explorer,
        }
    }

    /// Full pipeline for `endpoint`
    pub fn run(&self, endpoint: &str, name: Option<&str>) -> RunState {
        let span = tracing::info_span!("pipeline", endpoint);
        let _enter = span.enter();

        let mut state = RunState::new(endpoint, name);
        state.merge(StateUpdate::turn(Turn::user(export_request(endpoint))));

        let mut stage = Stage::Export;
        while stage != Stage::End {
            tracing::info!(?stage, status = %state.status, "entering stage");
            (state, stage) = self.step(stage, state);
        }

        tracing::info!(
            status = %state.status,
            entities = state.entities.len(),
            errors = state.errors.len(),
            "pipeline finished"
        );
        state
    }

    /// Execute one stage and pick the next
    fn step(&self, stage: Stage, mut state: RunState) -> (RunState, Stage) {
        match stage {
            Stage::Export => {
                state.merge(StateUpdate::status(RunStatus::Exporting));
                (self.export_loop().run(state), Stage::Validate)
            }
            Stage::Validate => {
                let status = validate(&state.transcript);
                state.merge(StateUpdate::status(status));
                let next = if state.is_failed() {
                    Stage::End
                } else {
                    Stage::PrepareParse
                };
                (state, next)
            }
            Stage::PrepareParse => {
                let update = prepare_parse(&state);
                state.merge(update);
                (state, Stage::Parse)
            }
            Stage::Parse => (self.parse_loop().run(state), Stage::End),
            Stage::End => (state, Stage::End),
        }
    }

    /// Discovery and fetch only
    pub fn export(&self, endpoint: &str, name: Option<&str>) -> RunState {
        let mut state = RunState::new(endpoint, name);
        state.merge(StateUpdate {
            turns: vec![Turn::user(export_request(endpoint))],
            status: Some(RunStatus::Exporting),
            ..StateUpdate::default()
        });
        self.export_loop().run(state)
    }

    /// Parse an already downloaded schema
    pub fn parse(&self, raw_json: &str, source_api: &str) -> RunState {
        let mut state = RunState::new(source_api, Some(source_api));
        state.merge(StateUpdate {
            turns: vec![Turn::user(format!(
                "Parse this schema from '{}':\n\n{}",
                source_api, raw_json
            ))],
            raw_schema: serde_json::from_str(raw_json).ok(),
            status: Some(RunStatus::Parsing),
            ..StateUpdate::default()
        });
        self.parse_loop().run(state)
    }

    fn export_loop(&self) -> ActionLoop<'a> {
        ActionLoop::new(
            &self.config,
            self.decider,
            self.explorer,
            ActionCatalog::export(),
        )
    }

    fn parse_loop(&self) -> ActionLoop<'a> {
        ActionLoop::new(
            &self.config,
            self.decider,
            self.explorer,
            ActionCatalog::parse(),
        )
    }
}

fn export_request(endpoint: &str) -> String {
    format!("Please analyze this API and export its schema: {}", endpoint)
}

/// `failed` if any turn mentions [`ERROR_MARKER`], else `success`
pub fn validate(transcript: &[Turn]) -> RunStatus {
    if transcript.iter().any(|t| t.content.contains(ERROR_MARKER)) {
        RunStatus::Failed
    } else {
        RunStatus::Success
    }
}

/// Instruction turn for the parse phase; empty when nothing was fetched
pub fn prepare_parse(state: &RunState) -> StateUpdate {
    match &state.raw_schema {
        Some(raw) => StateUpdate::turn(Turn::user(format!(
            "Now parse this schema into structured entities:\n\n{}",
            raw
        ))),
        None => StateUpdate::default(),
    }
}
