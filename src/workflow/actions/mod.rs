pub mod api;
pub mod calendar;
pub mod condition;
pub mod constant;
pub mod email;
pub mod end;
pub mod passthrough;
pub mod start;

use async_trait::async_trait;
use serde_json::Value;

use crate::{Result, common::Vars, runtime::ActionContext, workflow::node::NodeKind};

pub use api::ApiAction;
pub use calendar::GoogleCalendarAction;
pub use condition::ConditionAction;
pub use constant::ConstantAction;
pub use email::EmailAction;
pub use end::EndAction;
pub use passthrough::PassThroughAction;
pub use start::StartAction;

#[async_trait]
pub trait Action: Send + Sync {
    /// Creates a new instance of the action from the node's config.
    ///
    /// # Arguments
    ///
    /// * `config` - The [`Vars`] holding the editor-supplied parameters.
    ///
    /// # Returns
    ///
    /// Returns a [`Result`] containing the created action instance, or a
    /// validation error if a required parameter is missing or malformed.
    fn create(config: &Vars) -> Result<Self>
    where
        Self: Sized;

    /// Returns the JSON schema the config is checked against.
    fn schema() -> Value
    where
        Self: Sized;

    /// Returns the [`NodeKind`] this action handles.
    fn action_type(&self) -> NodeKind;

    /// Executes the node's action.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The [`ActionContext`] with resolved inputs and collaborators.
    ///
    /// # Returns
    ///
    /// Returns an [`Result<ActionOutput>`]; an `Err` marks the node as failed.
    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput>;
}

/// Output returned by an action's run method
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutput {
    /// value downstream nodes consume
    pub output_value: Value,
    /// set by condition nodes only; selects the outgoing handle
    pub condition_result: Option<bool>,
    /// raw collaborator response, when there was one
    pub last_response: Option<Value>,
}

impl ActionOutput {
    /// Create a successful action output
    pub fn success(output_value: Value) -> Self {
        Self {
            output_value,
            condition_result: None,
            last_response: None,
        }
    }

    /// Create a successful output that also records the collaborator response
    pub fn with_response(
        output_value: Value,
        response: Value,
    ) -> Self {
        Self {
            output_value,
            condition_result: None,
            last_response: Some(response),
        }
    }

    /// Create a condition output; the result doubles as the output value
    pub fn condition(result: bool) -> Self {
        Self {
            output_value: Value::Bool(result),
            condition_result: Some(result),
            last_response: None,
        }
    }
}

/// Validates a node config against an action schema.
pub(crate) fn validate_config(
    config: &Vars,
    schema: &Value,
) -> Result<()> {
    let instance: Value = config.clone().into();
    jsonschema::validate(schema, &instance)?;
    Ok(())
}

/// Reads a string-or-list config/input value as a list of trimmed, non-empty strings.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect(),
        _ => Vec::new(),
    }
}

/// Renders a scalar value as text, `None` for null/absent.
pub(crate) fn text_value(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_string_list() {
        assert_eq!(string_list(Some(&json!(["a@x.io", " b@x.io ", ""]))), vec!["a@x.io", "b@x.io"]);
        assert_eq!(string_list(Some(&json!("a@x.io, b@x.io,"))), vec!["a@x.io", "b@x.io"]);
        assert!(string_list(Some(&json!(null))).is_empty());
        assert!(string_list(None).is_empty());
    }

    #[test]
    fn test_text_value() {
        assert_eq!(text_value(Some(&json!("x"))), Some("x".to_string()));
        assert_eq!(text_value(Some(&json!(3))), Some("3".to_string()));
        assert_eq!(text_value(Some(&json!(null))), None);
    }

    #[test]
    fn test_condition_output() {
        let output = ActionOutput::condition(false);
        assert_eq!(output.output_value, json!(false));
        assert_eq!(output.condition_result, Some(false));
    }
}
