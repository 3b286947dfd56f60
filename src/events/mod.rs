//! Event types for workflow runs.
//!
//! Every status mutation the runner performs is also published as a
//! [`StatusEvent`], together with run lifecycle changes.

use crate::{
    NodeStatus,
    runtime::NodeUpdate,
    workflow::{edge::EdgeId, node::NodeId},
};

/// Top-level event published on the runner's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// A node's status and transient fields changed.
    Node {
        nid: NodeId,
        status: NodeStatus,
        update: NodeUpdate,
    },
    /// An edge was (de)activated.
    Edge {
        eid: EdgeId,
        animated: bool,
    },
    /// Run lifecycle.
    Run(RunEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        run_id: String,
        start_nodes: Vec<NodeId>,
    },
    Completed {
        run_id: String,
        execution_path: Vec<NodeId>,
    },
    Stopped {
        run_id: String,
    },
    Reset,
}

impl RunEvent {
    pub fn str(&self) -> &str {
        match self {
            RunEvent::Started {
                ..
            } => "Started",
            RunEvent::Completed {
                ..
            } => "Completed",
            RunEvent::Stopped {
                ..
            } => "Stopped",
            RunEvent::Reset => "Reset",
        }
    }
}

impl StatusEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, StatusEvent::Run(RunEvent::Completed { .. }))
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusEvent::Node {
                status: NodeStatus::Error,
                ..
            }
        )
    }
}
