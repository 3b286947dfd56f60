//! # Flowrunner
//!
//! Flowrunner executes workflow graphs composed in a visual editor.
//! A graph is a plain `{nodes, edges}` collection; the runner walks it
//! breadth-first from every `start` node, resolves each node's inputs from
//! upstream outputs, dispatches the node's side effect and reports every
//! status change back through a [`StatusSink`] so the editor can re-render.
//!
//! ## Core Features
//!
//! - **Breadth-first interpreter**: at-most-once dispatch per node, safe on cycles and diamond fan-in
//! - **Conditional fan-out**: condition nodes select their `true-source` / `false-source` edges
//! - **Partial-failure isolation**: a failing node abandons its own branch only
//! - **Pluggable collaborators**: HTTP, email and calendar calls go through traits with reqwest-backed defaults
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use flowrunner::{GraphStore, RunnerBuilder, WorkflowModel};
//!
//! let model = WorkflowModel::from_json(json_str)?;
//! let store = Arc::new(GraphStore::new(model.clone()));
//! let runner = RunnerBuilder::new().sink(store.clone()).build()?;
//!
//! let result = runner.run(&model, Some("team-42")).await?;
//! println!("{:?}", result.execution_path);
//! ```

mod builder;
mod clients;
mod common;
mod config;
mod error;
mod events;
mod model;
mod runner;
mod runtime;
mod utils;
mod workflow;

#[cfg(test)]
mod testing;

use std::sync::{Arc, RwLock};

pub use builder::RunnerBuilder;
pub use clients::{
    CalendarClient, CalendarRequest, CalendarResponse, Collaborators, EmailClient, EmailRequest, EmailResponse, EndpointCalendarClient, EndpointEmailClient, HttpClient,
    HttpMethod, HttpRequest, ReqwestHttpClient,
};
pub use common::Vars;
pub use config::{Config, EndpointConfig, HttpConfig, PacingConfig};
pub use error::FlowRunnerError;
pub use events::{RunEvent, StatusEvent};
pub use model::*;
pub use runner::{ExecutionResult, FixedPacing, NoPacing, PacePoint, Pacing, Runner};
pub use runtime::{Channel, ChannelEvent, ChannelOptions, GraphStore, NodeUpdate, StatusSink};
pub use workflow::{NodeKind, Workflow};

/// Result type alias for Flowrunner operations.
pub type Result<T> = std::result::Result<T, FlowRunnerError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
