use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    Result,
    common::Vars,
    runtime::ActionContext,
    workflow::{consts::INPUT_KEY, node::NodeKind},
};

use super::{Action, ActionOutput};

/// Terminates its branch. The runner never enqueues successors of an end node.
#[derive(Debug, Clone)]
pub struct EndAction;

#[async_trait]
impl Action for EndAction {
    fn create(_: &Vars) -> Result<Self> {
        Ok(EndAction)
    }

    fn schema() -> Value {
        json!({})
    }

    fn action_type(&self) -> NodeKind {
        NodeKind::End
    }

    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput> {
        Ok(ActionOutput::success(ctx.inputs().value(INPUT_KEY).cloned().unwrap_or(Value::Null)))
    }
}
