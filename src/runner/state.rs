use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use serde_json::Value;

use crate::{
    NodeStatus, utils,
    workflow::{edge::EdgeId, node::NodeId},
};

/// Mutable state of one run, owned by the traversal loop.
#[derive(Debug)]
pub(crate) struct RunState {
    run_id: String,
    /// nodes already dispatched; a node is dispatched at most once per run
    visited: HashSet<NodeId>,
    /// pending `(node, edge that led to it)` pairs
    queue: VecDeque<(NodeId, Option<EdgeId>)>,
    execution_path: Vec<NodeId>,
    outputs: HashMap<NodeId, Value>,
    /// raw collaborator responses received during this run
    responses: HashMap<NodeId, Value>,
    statuses: HashMap<NodeId, NodeStatus>,
    errors: HashMap<NodeId, String>,
    stopped: bool,
    started_at: i64,
}

impl RunState {
    pub fn new(
        run_id: impl Into<String>,
        start_nodes: &[NodeId],
    ) -> Self {
        Self {
            run_id: run_id.into(),
            visited: HashSet::new(),
            queue: start_nodes.iter().map(|nid| (nid.clone(), None)).collect(),
            execution_path: Vec::new(),
            outputs: HashMap::new(),
            responses: HashMap::new(),
            statuses: HashMap::new(),
            errors: HashMap::new(),
            stopped: false,
            started_at: utils::time::time_millis(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn pop(&mut self) -> Option<(NodeId, Option<EdgeId>)> {
        self.queue.pop_front()
    }

    pub fn enqueue(
        &mut self,
        nid: NodeId,
        via: Option<EdgeId>,
    ) {
        self.queue.push_back((nid, via));
    }

    pub fn is_visited(
        &self,
        nid: &str,
    ) -> bool {
        self.visited.contains(nid)
    }

    /// Marks `nid` visited and appends it to the execution path.
    /// Returns false when it was already visited; the entry must then be dropped.
    pub fn visit(
        &mut self,
        nid: &str,
    ) -> bool {
        if !self.visited.insert(nid.to_string()) {
            return false;
        }
        self.execution_path.push(nid.to_string());
        self.statuses.insert(nid.to_string(), NodeStatus::Loading);
        true
    }

    pub fn outputs(&self) -> &HashMap<NodeId, Value> {
        &self.outputs
    }

    pub fn responses(&self) -> &HashMap<NodeId, Value> {
        &self.responses
    }

    pub fn record_success(
        &mut self,
        nid: &str,
        output: Value,
        response: Option<Value>,
    ) {
        self.statuses.insert(nid.to_string(), NodeStatus::Success);
        self.outputs.insert(nid.to_string(), output);
        if let Some(response) = response {
            self.responses.insert(nid.to_string(), response);
        }
    }

    pub fn record_error(
        &mut self,
        nid: &str,
        message: String,
    ) {
        self.statuses.insert(nid.to_string(), NodeStatus::Error);
        self.errors.insert(nid.to_string(), message);
    }

    pub fn mark_stopped(&mut self) {
        self.stopped = true;
    }

    pub fn into_result(self) -> ExecutionResult {
        ExecutionResult {
            run_id: self.run_id,
            execution_path: self.execution_path,
            statuses: self.statuses,
            errors: self.errors,
            outputs: self.outputs,
            stopped: self.stopped,
            started_at: self.started_at,
            finished_at: utils::time::time_millis(),
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub run_id: String,
    /// node ids in dispatch order, without duplicates
    pub execution_path: Vec<NodeId>,
    /// final status of every dispatched node
    pub statuses: HashMap<NodeId, NodeStatus>,
    /// failure message of every node that ended in `error`
    pub errors: HashMap<NodeId, String>,
    /// output value of every node that ended in `success`
    pub outputs: HashMap<NodeId, Value>,
    /// true when [`Runner::stop`](crate::Runner::stop) ended the run early
    pub stopped: bool,
    /// epoch millis
    pub started_at: i64,
    /// epoch millis
    pub finished_at: i64,
}

impl ExecutionResult {
    /// Every dispatched node succeeded and the run was not stopped.
    pub fn succeeded(&self) -> bool {
        !self.stopped && self.errors.is_empty()
    }

    pub fn status_of(
        &self,
        nid: &str,
    ) -> Option<NodeStatus> {
        self.statuses.get(nid).copied()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_visit_once() {
        let mut state = RunState::new("r1", &["s".to_string()]);
        assert_eq!(state.pop(), Some(("s".to_string(), None)));
        assert!(state.visit("s"));
        assert!(!state.visit("s"));
        assert!(state.is_visited("s"));
        assert!(state.pop().is_none());

        let result = state.into_result();
        assert_eq!(result.execution_path, vec!["s".to_string()]);
        assert_eq!(result.status_of("s"), Some(NodeStatus::Loading));
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut state = RunState::new("r1", &["a".to_string(), "b".to_string()]);
        state.enqueue("c".to_string(), Some("e1".to_string()));
        let order: Vec<NodeId> = std::iter::from_fn(|| state.pop().map(|(nid, _)| nid)).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_result_summary() {
        let mut state = RunState::new("r1", &[]);
        state.visit("a");
        state.record_success("a", json!(1), Some(json!({"raw": 1})));
        state.visit("b");
        state.record_error("b", "API URL is required".to_string());
        assert_eq!(state.responses().get("a"), Some(&json!({"raw": 1})));
        assert!(state.responses().get("b").is_none());

        let result = state.into_result();
        assert!(!result.succeeded());
        assert_eq!(result.status_of("a"), Some(NodeStatus::Success));
        assert_eq!(result.status_of("b"), Some(NodeStatus::Error));
        assert_eq!(result.outputs.get("a"), Some(&json!(1)));
        assert!(result.outputs.get("b").is_none());
        assert_eq!(result.errors.get("b").map(String::as_str), Some("API URL is required"));
        assert!(result.finished_at >= result.started_at);
        assert!(result.status_of("ghost").is_none());
    }
}
