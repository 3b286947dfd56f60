//! Workflow edge definitions for connecting nodes.
//!
//! Either end of an edge may name a handle: the source handle selects which
//! output port it leaves from (`true-source` / `false-source` on condition
//! nodes), the target handle selects which input slot it feeds.

use crate::{
    model::EdgeModel,
    workflow::{
        consts::{
            END_DATE_TIME_KEY, END_INPUT_HANDLE, FALSE_SOURCE, INPUT_A_HANDLE, INPUT_B_HANDLE, INPUT_KEY, START_DATE_TIME_KEY, START_INPUT_HANDLE, TRUE_SOURCE, VALUE_A_KEY,
            VALUE_B_KEY,
        },
        node::NodeId,
    },
};

/// Unique identifier for an edge within a workflow.
pub type EdgeId = String;

/// Runtime edge representation connecting two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Unique edge identifier.
    pub id: EdgeId,
    /// ID of the source node.
    pub source: NodeId,
    /// ID of the target node.
    pub target: NodeId,
    /// Which output handle this edge connects from.
    pub source_handle: Option<String>,
    /// Which input handle this edge connects to.
    pub target_handle: Option<String>,
}

impl From<&EdgeModel> for Edge {
    fn from(model: &EdgeModel) -> Self {
        Self {
            id: model.id.clone(),
            source: model.source.clone(),
            target: model.target.clone(),
            source_handle: model.source_handle.clone(),
            target_handle: model.target_handle.clone(),
        }
    }
}

impl Edge {
    /// Whether this edge passes an outgoing handle filter. `None` accepts every edge.
    pub fn matches_source(
        &self,
        filter: Option<&str>,
    ) -> bool {
        match filter {
            None => true,
            Some(handle) => self.source_handle.as_deref() == Some(handle),
        }
    }

    /// The input slot this edge feeds on its target.
    pub fn input_slot(&self) -> InputSlot {
        InputSlot::from_handle(self.target_handle.as_deref())
    }
}

/// Outgoing handle selected by a condition result.
pub fn condition_handle(result: bool) -> &'static str {
    if result { TRUE_SOURCE } else { FALSE_SOURCE }
}

/// Named input slot a target handle maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    ValueA,
    ValueB,
    StartDateTime,
    EndDateTime,
    Input,
}

impl InputSlot {
    pub fn from_handle(handle: Option<&str>) -> Self {
        match handle {
            Some(INPUT_A_HANDLE) => InputSlot::ValueA,
            Some(INPUT_B_HANDLE) => InputSlot::ValueB,
            Some(START_INPUT_HANDLE) => InputSlot::StartDateTime,
            Some(END_INPUT_HANDLE) => InputSlot::EndDateTime,
            _ => InputSlot::Input,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            InputSlot::ValueA => VALUE_A_KEY,
            InputSlot::ValueB => VALUE_B_KEY,
            InputSlot::StartDateTime => START_DATE_TIME_KEY,
            InputSlot::EndDateTime => END_DATE_TIME_KEY,
            InputSlot::Input => INPUT_KEY,
        }
    }
}
