//! Breadth-first workflow runner.
//!
//! A run seeds a FIFO queue with every `start` node and drains it one entry
//! at a time. Each popped node is dispatched at most once, its status is
//! written to the [`StatusSink`] and mirrored on the event [`Channel`], and on
//! success its outgoing edges (filtered by handle for condition nodes) are
//! enqueued. A failing node abandons only its own branch.

mod inputs;
mod pacing;
mod state;

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::{
    Config, FlowRunnerError, NodeStatus, Result, WorkflowModel,
    clients::Collaborators,
    events::{RunEvent, StatusEvent},
    runtime::{ActionContext, Channel, NodeUpdate, StatusSink},
    utils,
    workflow::{
        NodeKind, Workflow,
        edge::condition_handle,
        node::{Node, NodeId},
    },
};

pub use pacing::{FixedPacing, NoPacing, PacePoint, Pacing};
pub use state::ExecutionResult;

use state::RunState;

/// Run currently owning the runner, if any.
#[derive(Debug, Default)]
struct ActiveRun {
    run_id: Option<String>,
    node: Option<NodeId>,
}

/// Releases the runner when a run ends, including when its future is dropped.
struct RunGuard<'a> {
    runner: &'a Runner,
    run_id: String,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.runner.release(&self.run_id);
    }
}

/// Executes workflow graphs against a set of collaborators.
///
/// Only one run is in flight at a time. [`stop`](Runner::stop) is
/// cooperative: an external call already awaiting completes and lands its
/// status, after which the traversal ends.
pub struct Runner {
    config: Config,
    clients: Collaborators,
    sink: Arc<dyn StatusSink>,
    channel: Arc<Channel>,
    pacing: Arc<dyn Pacing>,
    active: Mutex<ActiveRun>,
}

impl Runner {
    pub(crate) fn new(
        config: Config,
        clients: Collaborators,
        sink: Arc<dyn StatusSink>,
        channel: Arc<Channel>,
        pacing: Arc<dyn Pacing>,
    ) -> Self {
        Self {
            config,
            clients,
            sink,
            channel,
            pacing,
            active: Mutex::new(ActiveRun::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Event channel mirroring every status write and run lifecycle change.
    pub fn channel(&self) -> Arc<Channel> {
        self.channel.clone()
    }

    pub fn is_running(&self) -> bool {
        self.active().run_id.is_some()
    }

    /// Node currently being dispatched.
    pub fn active_node(&self) -> Option<NodeId> {
        self.active().node.clone()
    }

    /// Runs the graph to completion, or until [`stop`](Runner::stop).
    ///
    /// Fails with [`FlowRunnerError::NoStartNode`] when the graph has no
    /// `start` node and with [`FlowRunnerError::AlreadyRunning`] while
    /// another run is in flight; neither touches any status. Node failures
    /// never fail the run, they are reported in the [`ExecutionResult`].
    pub async fn run(
        &self,
        model: &WorkflowModel,
        team_id: Option<&str>,
    ) -> Result<ExecutionResult> {
        let workflow = Workflow::from(model);
        let start_nodes = workflow.start_nodes();
        if start_nodes.is_empty() {
            return Err(FlowRunnerError::NoStartNode);
        }

        let run_id = self.begin()?;
        let _guard = RunGuard {
            runner: self,
            run_id: run_id.clone(),
        };
        let team_id = team_id.map(str::to_string).or_else(|| self.config.team_id.clone());
        info!(run_id = %run_id, nodes = workflow.node_count(), edges = workflow.edge_count(), start_nodes = ?start_nodes, "run started");
        debug!("\n{}", workflow.schema());

        self.clear_statuses(model);
        self.channel.emit(StatusEvent::Run(RunEvent::Started {
            run_id: run_id.clone(),
            start_nodes: start_nodes.clone(),
        }));

        let mut state = RunState::new(run_id.clone(), &start_nodes);
        while let Some((nid, via)) = state.pop() {
            if !self.is_current(&run_id) {
                state.mark_stopped();
                break;
            }
            if !state.visit(&nid) {
                debug!(run_id = %run_id, nid = %nid, "already dispatched, arrival dropped");
                continue;
            }
            let Some(node) = workflow.get_node(&nid) else {
                continue;
            };

            self.pacing.pause(PacePoint::BeforeNode).await;
            self.dispatch(&workflow, node, via.as_deref(), team_id.as_deref(), &mut state).await;
            self.pacing.pause(PacePoint::AfterNode).await;
        }

        // a stop after the last node still counts as stopped
        if !self.is_current(&run_id) {
            state.mark_stopped();
        }
        let result = state.into_result();
        self.finish(&result);

        Ok(result)
    }

    /// Ends the active run once its in-flight node completes.
    pub fn stop(&self) {
        let run_id = {
            let mut active = self.active();
            active.node = None;
            active.run_id.take()
        };

        if let Some(run_id) = run_id {
            info!(run_id = %run_id, "run stopped");
            self.channel.emit(StatusEvent::Run(RunEvent::Stopped {
                run_id,
            }));
        }
    }

    /// Returns every node of `model` to `initial` and every edge to not
    /// animated, whether or not a run is active.
    pub fn reset(
        &self,
        model: &WorkflowModel,
    ) {
        self.clear_statuses(model);
        self.channel.emit(StatusEvent::Run(RunEvent::Reset));
    }

    async fn dispatch(
        &self,
        workflow: &Workflow,
        node: &Node,
        via: Option<&str>,
        team_id: Option<&str>,
        state: &mut RunState,
    ) {
        let run_id = state.run_id().to_string();
        self.set_active_node(&run_id, Some(node.id.clone()));
        debug!(run_id = %run_id, nid = %node.id, kind = %node.kind, via = ?via, "dispatching node");

        if let Some(eid) = via {
            self.publish_edge(eid, true);
        }
        self.publish_node(&node.id, NodeStatus::Loading, NodeUpdate::default());

        let ctx = ActionContext::new(node.id.clone(), self.clients.clone())
            .with_inputs(inputs::resolve(workflow, &node.id, state.outputs(), state.responses()))
            .with_team_id(team_id.map(str::to_string))
            .with_outputs(state.outputs().clone())
            .with_default_headers(self.config.http.default_headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<BTreeMap<_, _>>())
            .with_simulated_delay(Duration::from_millis(self.config.simulated_action_delay_ms));

        let result = match node.create_action() {
            Ok(action) => action.run(&ctx).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(output) => {
                state.record_success(&node.id, output.output_value.clone(), output.last_response.clone());
                self.publish_node(
                    &node.id,
                    NodeStatus::Success,
                    NodeUpdate {
                        output_value: Some(output.output_value),
                        condition_result: output.condition_result,
                        last_response: output.last_response,
                        last_error: None,
                    },
                );
                if let Some(eid) = via {
                    self.publish_edge(eid, false);
                }

                if node.kind == NodeKind::End {
                    debug!(run_id = %run_id, nid = %node.id, "branch reached end");
                } else {
                    let handle = match node.kind {
                        NodeKind::Condition => output.condition_result.map(condition_handle),
                        _ => None,
                    };
                    for edge in workflow.outgoing_edges(&node.id, handle) {
                        if state.is_visited(&edge.target) {
                            debug!(run_id = %run_id, nid = %edge.target, eid = %edge.id, "target already dispatched, not enqueued");
                            continue;
                        }
                        debug!(run_id = %run_id, nid = %edge.target, eid = %edge.id, "enqueued");
                        state.enqueue(edge.target.clone(), Some(edge.id.clone()));
                    }
                }
            }
            Err(err) => {
                let message = err.to_string();
                warn!(run_id = %run_id, nid = %node.id, kind = %node.kind, error = %message, "node failed");
                state.record_error(&node.id, message.clone());
                self.publish_node(&node.id, NodeStatus::Error, NodeUpdate::error(message));
                if let Some(eid) = via {
                    self.publish_edge(eid, false);
                }
            }
        }

        self.set_active_node(&run_id, None);
    }

    fn begin(&self) -> Result<String> {
        let mut active = self.active();
        if active.run_id.is_some() {
            return Err(FlowRunnerError::AlreadyRunning);
        }
        let run_id = utils::longid();
        active.run_id = Some(run_id.clone());
        active.node = None;
        Ok(run_id)
    }

    fn finish(
        &self,
        result: &ExecutionResult,
    ) {
        self.release(&result.run_id);

        if result.stopped {
            info!(run_id = %result.run_id, dispatched = result.execution_path.len(), "run ended after stop");
            return;
        }

        info!(run_id = %result.run_id, dispatched = result.execution_path.len(), failed = result.errors.len(), "run completed");
        self.channel.emit(StatusEvent::Run(RunEvent::Completed {
            run_id: result.run_id.clone(),
            execution_path: result.execution_path.clone(),
        }));
    }

    /// Clears the running flag if `run_id` still owns it.
    fn release(
        &self,
        run_id: &str,
    ) {
        let mut active = self.active();
        if active.run_id.as_deref() == Some(run_id) {
            active.run_id = None;
            active.node = None;
        }
    }

    fn is_current(
        &self,
        run_id: &str,
    ) -> bool {
        self.active().run_id.as_deref() == Some(run_id)
    }

    fn set_active_node(
        &self,
        run_id: &str,
        node: Option<NodeId>,
    ) {
        let mut active = self.active();
        // a stopped run's straggler must not overwrite a newer run's marker
        if active.run_id.as_deref() == Some(run_id) {
            active.node = node;
        }
    }

    fn active(&self) -> std::sync::MutexGuard<'_, ActiveRun> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every node and edge of `model` to initial, dangling edges included.
    fn clear_statuses(
        &self,
        model: &WorkflowModel,
    ) {
        for node in &model.nodes {
            self.publish_node(&node.id, NodeStatus::Initial, NodeUpdate::cleared());
        }
        for edge in &model.edges {
            self.publish_edge(&edge.id, false);
        }
    }

    fn publish_node(
        &self,
        nid: &str,
        status: NodeStatus,
        update: NodeUpdate,
    ) {
        self.sink.update_node_status(nid, status, update.clone());
        self.channel.emit(StatusEvent::Node {
            nid: nid.to_string(),
            status,
            update,
        });
    }

    fn publish_edge(
        &self,
        eid: &str,
        animated: bool,
    ) {
        self.sink.update_edge_status(eid, animated);
        self.channel.emit(StatusEvent::Edge {
            eid: eid.to_string(),
            animated,
        });
    }
}
