//! Status sink: where the runner writes node and edge status.

use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tracing::trace;

use crate::{NodeStatus, WorkflowModel};

/// Transient per-run fields attached to a status update.
///
/// `None` fields leave the stored value untouched, except that an update to
/// [`NodeStatus::Initial`] clears every transient field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub output_value: Option<Value>,
    pub condition_result: Option<bool>,
    pub last_response: Option<Value>,
    pub last_error: Option<String>,
}

impl NodeUpdate {
    /// No transient fields; paired with [`NodeStatus::Initial`] it clears them all.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            last_error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Receives every status mutation the runner performs. Applied synchronously.
pub trait StatusSink: Send + Sync {
    fn update_node_status(
        &self,
        nid: &str,
        status: NodeStatus,
        update: NodeUpdate,
    );

    fn update_edge_status(
        &self,
        eid: &str,
        animated: bool,
    );
}

/// In-memory `{nodes, edges}` collection that the runner mutates and the
/// rendering layer reads back through [`GraphStore::snapshot`].
///
/// Updates addressed to ids that are not in the collection are ignored.
#[derive(Debug, Default)]
pub struct GraphStore {
    model: RwLock<WorkflowModel>,
}

impl GraphStore {
    pub fn new(model: WorkflowModel) -> Self {
        Self {
            model: RwLock::new(model),
        }
    }

    /// A copy of the current graph including status fields.
    pub fn snapshot(&self) -> WorkflowModel {
        self.model.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns every node to `initial` and every edge to not animated.
    pub fn reset(&self) {
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        for node in model.nodes.iter_mut() {
            clear_node(node);
        }
        for edge in model.edges.iter_mut() {
            edge.animated = false;
        }
    }
}

fn clear_node(node: &mut crate::NodeModel) {
    node.status = NodeStatus::Initial;
    node.output_value = None;
    node.condition_result = None;
    node.last_response = None;
    node.last_error = None;
}

impl StatusSink for GraphStore {
    fn update_node_status(
        &self,
        nid: &str,
        status: NodeStatus,
        update: NodeUpdate,
    ) {
        trace!(nid = %nid, status = %status.as_ref(), "node status");
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        let Some(node) = model.nodes.iter_mut().find(|n| n.id == nid) else {
            return;
        };

        if status == NodeStatus::Initial {
            clear_node(node);
            return;
        }

        node.status = status;
        if update.output_value.is_some() {
            node.output_value = update.output_value;
        }
        if update.condition_result.is_some() {
            node.condition_result = update.condition_result;
        }
        if update.last_response.is_some() {
            node.last_response = update.last_response;
        }
        if update.last_error.is_some() {
            node.last_error = update.last_error;
        }
    }

    fn update_edge_status(
        &self,
        eid: &str,
        animated: bool,
    ) {
        trace!(eid = %eid, animated, "edge status");
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(edge) = model.edges.iter_mut().find(|e| e.id == eid) {
            edge.animated = animated;
        }
    }
}
