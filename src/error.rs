//! Error types for Flowrunner.
//!
//! All errors in Flowrunner are represented by the `FlowRunnerError` enum.
//! Only [`FlowRunnerError::NoStartNode`] and [`FlowRunnerError::AlreadyRunning`]
//! ever escape a run; every other variant is caught at the node dispatch
//! boundary and recorded on the failing node.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Flowrunner operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowRunnerError {
    /// The graph has no node of type `start`; nothing was traversed.
    #[error("No start node found in workflow")]
    NoStartNode,

    /// A previous run is still in flight on this runner.
    #[error("A workflow run is already in progress")]
    AlreadyRunning,

    /// Missing or malformed node configuration, detected before any external call.
    #[error("{0}")]
    Validation(String),

    /// A collaborator answered with a failure (non-2xx, `success: false`, transport error).
    #[error("{0}")]
    ExternalCall(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Workflow definition errors.
    #[error("{0}")]
    Workflow(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<FlowRunnerError> for String {
    fn from(val: FlowRunnerError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for FlowRunnerError {
    fn from(error: std::io::Error) -> Self {
        FlowRunnerError::IoError(error.to_string())
    }
}

impl From<FlowRunnerError> for std::io::Error {
    fn from(val: FlowRunnerError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for FlowRunnerError {
    fn from(error: serde_json::Error) -> Self {
        FlowRunnerError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for FlowRunnerError {
    fn from(error: toml::de::Error) -> Self {
        FlowRunnerError::Config(error.to_string())
    }
}

impl From<reqwest::Error> for FlowRunnerError {
    fn from(error: reqwest::Error) -> Self {
        FlowRunnerError::ExternalCall(format!("Http error: {}", error))
    }
}

impl From<jsonschema::ValidationError<'_>> for FlowRunnerError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        FlowRunnerError::Validation(error.to_string())
    }
}
