use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    Result,
    common::Vars,
    runtime::ActionContext,
    workflow::{consts::VALUE_KEY, node::NodeKind},
};

use super::{Action, ActionOutput};

/// Entry point of a run. Emits `config.value`, or `true` when unset.
#[derive(Debug, Clone)]
pub struct StartAction {
    value: Option<Value>,
}

#[async_trait]
impl Action for StartAction {
    fn create(config: &Vars) -> Result<Self> {
        Ok(StartAction {
            value: config.value(VALUE_KEY).cloned(),
        })
    }

    fn schema() -> Value {
        json!({})
    }

    fn action_type(&self) -> NodeKind {
        NodeKind::Start
    }

    async fn run(
        &self,
        _: &ActionContext,
    ) -> Result<ActionOutput> {
        Ok(ActionOutput::success(self.value.clone().unwrap_or(Value::Bool(true))))
    }
}
