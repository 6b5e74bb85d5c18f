//! Orchestration for GraphMorph
//!
//! Ties discovery, fetching and parsing together behind an external
//! decision-maker.
//!
//! ## Pieces
//! - [`ActionCatalog`]: named, typed actions with declared argument schemas
//! - [`ActionLoop`]: bounded decide/act loop over one catalog
//! - [`Workflow`]: export → validate → parse pipeline
//! - [`RunState`]: the record every step appends to via [`StateUpdate`]
//!
//! ## Usage
//! ```rust,ignore
//! use graphmorph_agent::Workflow;
//! use graphmorph_discovery::HttpExplorer;
//!
//! let explorer = HttpExplorer::new(&config.http)?;
//! let workflow = Workflow::new(&config.agent, &my_decider, &explorer);
//! let result = workflow.run("https://countries.trevorblades.com/graphql", None);
//! println!("{} entities, status {}", result.entities.len(), result.status);
//! ```

mod action_loop;
pub mod actions;
mod decision;
mod state;
mod workflow;

pub use action_loop::ActionLoop;
pub use actions::{ActionCatalog, ActionContext, ActionName, ActionOutcome};
pub use decision::{ActionSpec, AgentError, Decision, DecisionMaker};
pub use state::{ActionCall, ApiUpdate, Role, RunState, RunStatus, StateUpdate, Turn};
pub use workflow::{prepare_parse, validate, Stage, Workflow, ERROR_MARKER};
