//! Bounded decide/act loop
//!
//! `START → DECIDE → ACT → DECIDE → … → END`. Each `DECIDE` hands the whole
//! transcript and the catalog to the decision-maker; each `ACT` dispatches
//! one action and appends its result line as a tool turn.

use crate::actions::{ActionCatalog, ActionContext};
use crate::decision::{Decision, DecisionMaker};
use crate::state::{ActionCall, RunState, RunStatus, StateUpdate, Turn};
use graphmorph_common::{AgentConfig, Verdict};
use graphmorph_discovery::ApiExplorer;
use std::time::{Duration, Instant};

/// One inner loop over a fixed catalog
pub struct ActionLoop<'a> {
    decider: &'a dyn DecisionMaker,
    explorer: &'a dyn ApiExplorer,
    catalog: ActionCatalog,
    max_iterations: u32,
    run_timeout: Duration,
}

impl<'a> ActionLoop<'a> {
    pub fn new(
        config: &AgentConfig,
        decider: &'a dyn DecisionMaker,
        explorer: &'a dyn ApiExplorer,
        catalog: ActionCatalog,
    ) -> Self {
        Self {
            decider,
            explorer,
            catalog,
            max_iterations: config.max_iterations,
            run_timeout: config.run_timeout(),
        }
    }

    /// Drive the loop until the decision-maker finishes or a limit is hit
    ///
    /// Limits and decision-maker failures end the loop with `status = failed`,
    /// an `ERROR` system turn and a matching error entry.
    pub fn run(&self, mut state: RunState) -> RunState {
        let specs = self.catalog.specs();
        let started = Instant::now();

        for step in 1..=self.max_iterations {
            if started.elapsed() > self.run_timeout {
                return abort(
                    state,
                    format!("run timeout of {}s exceeded", self.run_timeout.as_secs()),
                );
            }

            let decision = match self.decider.decide(&state.transcript, &specs) {
                Ok(decision) => decision,
                Err(err) => return abort(state, err.to_string()),
            };

            let (name, arguments) = match decision {
                Decision::Finish(answer) => {
                    tracing::info!(step, "decision maker finished");
                    state.merge(StateUpdate::turn(Turn::assistant(answer)));
                    return state;
                }
                Decision::Invoke { name, arguments } => (name, arguments),
            };

            let call = ActionCall {
                id: format!("call_{}", step),
                name,
                arguments,
            };
            tracing::info!(step, action = %call.name, "acting");
            state.merge(StateUpdate::turn(Turn::action_request(call.clone())));

            let outcome = {
                let ctx = ActionContext {
                    explorer: self.explorer,
                    state: &state,
                };
                self.catalog.execute(&ctx, &call)
            };
            tracing::debug!(step, verdict = %outcome.verdict, "action finished");
            state.merge(outcome.into_update(&call.id));
        }

        abort(
            state,
            format!("iteration cap of {} reached", self.max_iterations),
        )
    }
}

fn abort(mut state: RunState, reason: String) -> RunState {
    tracing::warn!(%reason, "action loop aborted");
    let message = format!("action loop aborted: {}", reason);
    state.merge(StateUpdate {
        turns: vec![Turn::system(Verdict::Error.line(&message))],
        errors: vec![message],
        status: Some(RunStatus::Failed),
        ..StateUpdate::default()
    });
    state
}
