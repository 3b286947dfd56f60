//! Runtime workflow representation using a directed graph.
//!
//! The editor's `{nodes, edges}` snapshot is loaded into a petgraph
//! `DiGraph` once per run. Edge lookups are returned in the order the edges
//! appear in the snapshot so traversal order is deterministic.

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};
use tracing::debug;

use crate::{
    WorkflowModel,
    workflow::{
        edge::Edge,
        node::{Node, NodeId, NodeKind},
    },
};

/// Runtime workflow representation as a directed graph.
///
/// Edges that reference node ids missing from the snapshot are dropped
/// while loading; they are inert during a run.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    graph: DiGraph<Node, Edge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Workflow {
    /// Output a human-readable representation of the workflow graph
    pub fn schema(&self) -> String {
        let graph = &self.graph;
        let mut lines = Vec::new();

        lines.push("=== Workflow Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", graph.node_count(), graph.edge_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for idx in graph.node_indices() {
            let node = &graph[idx];
            lines.push(format!("[{}] (type: {})", node.id, node.kind));
        }
        lines.push(String::new());

        lines.push("--- Edges ---".to_string());
        for idx in graph.edge_indices() {
            let edge = &graph[idx];
            lines.push(format!(
                "{} --[{}]--> {} [{}] (id: {})",
                edge.source,
                edge.source_handle.as_deref().unwrap_or("source"),
                edge.target,
                edge.target_handle.as_deref().unwrap_or("target"),
                edge.id
            ));
        }
        lines.push(String::new());

        lines.push("--- Graph Structure ---".to_string());
        for idx in graph.node_indices() {
            let node = &graph[idx];
            let outgoing: Vec<String> = self
                .outgoing_edges(&node.id, None)
                .into_iter()
                .map(|e| format!("{}({})", e.target, e.source_handle.as_deref().unwrap_or("source")))
                .collect();

            if outgoing.is_empty() {
                lines.push(format!("{} -> (end)", node.id));
            } else {
                lines.push(format!("{} -> {}", node.id, outgoing.join(", ")));
            }
        }

        lines.join("\n")
    }

    /// get node by id
    pub fn get_node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    /// ids of every `start` node, in snapshot order
    pub fn start_nodes(&self) -> Vec<NodeId> {
        self.graph.node_indices().filter(|idx| self.graph[*idx].kind == NodeKind::Start).map(|idx| self.graph[idx].id.clone()).collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges whose target is `nid`, in snapshot order.
    pub fn incoming_edges(
        &self,
        nid: &str,
    ) -> Vec<&Edge> {
        self.edges_directed(nid, Direction::Incoming)
    }

    /// Edges leaving `nid` that pass the source handle filter, in snapshot order.
    pub fn outgoing_edges(
        &self,
        nid: &str,
        source_handle: Option<&str>,
    ) -> Vec<&Edge> {
        self.edges_directed(nid, Direction::Outgoing).into_iter().filter(|e| e.matches_source(source_handle)).collect()
    }

    fn edges_directed(
        &self,
        nid: &str,
        direction: Direction,
    ) -> Vec<&Edge> {
        let Some(idx) = self.index.get(nid) else {
            return Vec::new();
        };

        // petgraph walks adjacency lists newest-first
        let mut edges: Vec<(EdgeIndex, &Edge)> = self.graph.edges_directed(*idx, direction).map(|e| (e.id(), e.weight())).collect();
        edges.sort_by_key(|(eidx, _)| *eidx);
        edges.into_iter().map(|(_, e)| e).collect()
    }
}

impl From<&WorkflowModel> for Workflow {
    fn from(model: &WorkflowModel) -> Self {
        let mut graph: DiGraph<Node, Edge> = DiGraph::new();
        let mut index = HashMap::new();

        for node in model.nodes.iter() {
            if index.contains_key(&node.id) {
                debug!(nid = %node.id, "duplicate node id ignored");
                continue;
            }
            let node = Node::from(node);
            let nid = node.id.clone();
            let node_idx = graph.add_node(node);
            index.insert(nid, node_idx);
        }

        for edge in model.edges.iter() {
            match (index.get(&edge.source), index.get(&edge.target)) {
                (Some(source), Some(target)) => {
                    graph.add_edge(*source, *target, Edge::from(edge));
                }
                _ => {
                    debug!(eid = %edge.id, source = %edge.source, target = %edge.target, "edge references a missing node, ignored");
                }
            }
        }

        Self {
            graph,
            index,
        }
    }
}
