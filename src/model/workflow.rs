use serde::{Deserialize, Serialize};

use crate::{
    FlowRunnerError, Result,
    model::{EdgeModel, NodeModel},
};

/// The `{nodes, edges}` collection shared between the editor and the runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowModel {
    #[serde(default)]
    pub nodes: Vec<NodeModel>,
    #[serde(default)]
    pub edges: Vec<EdgeModel>,
}

impl WorkflowModel {
    pub fn new(
        nodes: Vec<NodeModel>,
        edges: Vec<EdgeModel>,
    ) -> Self {
        Self {
            nodes,
            edges,
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let workflow = serde_json::from_str::<WorkflowModel>(s);
        match workflow {
            Ok(v) => Ok(v),
            Err(e) => Err(FlowRunnerError::Workflow(format!("{}", e))),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn node(
        &self,
        id: &str,
    ) -> Option<&NodeModel> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(
        &self,
        id: &str,
    ) -> Option<&EdgeModel> {
        self.edges.iter().find(|e| e.id == id)
    }
}
