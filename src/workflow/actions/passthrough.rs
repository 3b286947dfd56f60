use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    Result,
    common::Vars,
    runtime::ActionContext,
    workflow::{consts::INPUT_KEY, node::NodeKind},
};

use super::{Action, ActionOutput};

/// Forwards the generic `input` value unchanged.
///
/// Backs `branch` (explicit fan-out), `join` (first arrival passes through,
/// no barrier) and every node type the runner has no handler for, which
/// additionally waits for the configured simulated delay.
#[derive(Debug, Clone)]
pub struct PassThroughAction {
    kind: NodeKind,
    simulated: bool,
}

impl PassThroughAction {
    pub fn branch() -> Self {
        Self {
            kind: NodeKind::Branch,
            simulated: false,
        }
    }

    pub fn join() -> Self {
        Self {
            kind: NodeKind::Join,
            simulated: false,
        }
    }

    pub fn simulated(tag: &str) -> Self {
        Self {
            kind: NodeKind::Other(tag.to_string()),
            simulated: true,
        }
    }
}

#[async_trait]
impl Action for PassThroughAction {
    fn create(_: &Vars) -> Result<Self> {
        Ok(Self::branch())
    }

    fn schema() -> Value {
        json!({})
    }

    fn action_type(&self) -> NodeKind {
        self.kind.clone()
    }

    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput> {
        if self.simulated {
            debug!(nid = %ctx.nid(), kind = %self.kind, delay_ms = ctx.simulated_delay().as_millis() as u64, "simulating action");
            tokio::time::sleep(ctx.simulated_delay()).await;
        }
        Ok(ActionOutput::success(ctx.inputs().value(INPUT_KEY).cloned().unwrap_or(Value::Null)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_branch_and_join_forward_input() {
        let ctx = testing::context("b").with_inputs(Vars::new().with("input", json!({"id": 1})));
        for action in [PassThroughAction::branch(), PassThroughAction::join()] {
            let output = action.run(&ctx).await.unwrap();
            assert_eq!(output.output_value, json!({"id": 1}));
            assert!(output.condition_result.is_none());
        }
    }

    #[tokio::test]
    async fn test_missing_input_is_null() {
        let output = PassThroughAction::join().run(&testing::context("j")).await.unwrap();
        assert_eq!(output.output_value, Value::Null);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_waits_for_delay() {
        let action = PassThroughAction::simulated("slackAction");
        assert_eq!(action.action_type(), NodeKind::Other("slackAction".to_string()));

        let ctx = testing::context("x").with_inputs(Vars::new().with("input", "hi")).with_simulated_delay(Duration::from_secs(1));
        let started = tokio::time::Instant::now();
        let output = action.run(&ctx).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(output.output_value, json!("hi"));
    }
}
