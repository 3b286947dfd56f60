use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    FlowRunnerError, Result,
    clients::EmailRequest,
    common::Vars,
    runtime::ActionContext,
    workflow::{node::NodeKind, template},
};

use super::{Action, ActionOutput, string_list, text_value, validate_config};

const SUBJECT_KEY: &str = "subject";

/// Sends a templated email through the email collaborator.
///
/// `{{#nodeId.path#}}` placeholders in recipients and in the configured
/// subject resolve against outputs produced earlier in the run.
#[derive(Debug, Clone)]
pub struct EmailAction {
    template: String,
    recipients: Vec<String>,
    subject: Option<String>,
    custom_data: Map<String, Value>,
}

#[async_trait]
impl Action for EmailAction {
    fn create(config: &Vars) -> Result<Self> {
        validate_config(config, &Self::schema())?;

        let template = config.get::<String>("template").filter(|t| !t.trim().is_empty()).ok_or_else(|| FlowRunnerError::Validation("Email template is required".to_string()))?;
        let recipients = string_list(config.value("recipients"));
        if recipients.is_empty() {
            return Err(FlowRunnerError::Validation("At least one recipient is required".to_string()));
        }

        let custom_data = match config.value("customData") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };

        Ok(EmailAction {
            template,
            recipients,
            subject: text_value(config.value(SUBJECT_KEY)),
            custom_data,
        })
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "template": { "type": ["string", "null"] },
                "recipients": { "type": ["array", "string", "null"] },
                "subject": { "type": ["string", "null"] },
                "customData": { "type": ["object", "null"] }
            }
        })
    }

    fn action_type(&self) -> NodeKind {
        NodeKind::EmailAction
    }

    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput> {
        let recipients = self.resolve_recipients(ctx)?;
        let subject = match text_value(ctx.inputs().value(SUBJECT_KEY)) {
            Some(subject) => Some(subject),
            None => self.subject.as_deref().map(|s| template::resolve_template(ctx.outputs(), s)).transpose()?,
        };

        let mut custom_data = self.custom_data.clone();
        for (key, value) in ctx.inputs().iter() {
            custom_data.insert(key.clone(), value.clone());
        }

        let request = EmailRequest {
            template: self.template.clone(),
            recipients,
            subject,
            custom_data: Value::Object(custom_data),
        };
        debug!(nid = %ctx.nid(), template = %request.template, recipients = request.recipients.len(), "sending email");

        let response = ctx.clients().email.send(request).await?;
        if !response.success {
            return Err(FlowRunnerError::ExternalCall(response.error.unwrap_or_else(|| "Failed to send email".to_string())));
        }

        let response = serde_json::to_value(&response)?;
        Ok(ActionOutput::with_response(response.clone(), response))
    }
}

impl EmailAction {
    /// Resolves placeholders; a placeholder may expand to a comma-separated list.
    fn resolve_recipients(
        &self,
        ctx: &ActionContext,
    ) -> Result<Vec<String>> {
        let mut recipients = Vec::new();
        for recipient in &self.recipients {
            let resolved = template::resolve_template(ctx.outputs(), recipient)?;
            recipients.extend(resolved.split(',').map(|r| r.trim().to_string()).filter(|r| !r.is_empty()));
        }

        if recipients.is_empty() {
            return Err(FlowRunnerError::Validation("At least one recipient is required".to_string()));
        }
        Ok(recipients)
    }
}
