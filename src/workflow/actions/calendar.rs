use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    FlowRunnerError, Result,
    clients::CalendarRequest,
    common::Vars,
    runtime::ActionContext,
    workflow::{
        consts::{END_DATE_TIME_KEY, START_DATE_TIME_KEY},
        node::NodeKind,
    },
};

use super::{Action, ActionOutput, string_list, text_value, validate_config};

const DEFAULT_CALENDAR_ID: &str = "primary";

/// Creates, updates, lists or deletes calendar events through the calendar
/// collaborator. Event fields come from resolved inputs first, then config.
#[derive(Debug, Clone)]
pub struct GoogleCalendarAction {
    config: Vars,
    operation: String,
}

impl GoogleCalendarAction {
    /// Input value for `key`, falling back to the config value.
    fn field(
        &self,
        ctx: &ActionContext,
        key: &str,
    ) -> Option<String> {
        text_value(ctx.inputs().value(key)).or_else(|| text_value(self.config.value(key))).filter(|v| !v.is_empty())
    }

    fn max_results(&self) -> Result<Option<u32>> {
        match self.config.value("maxResults") {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).map(Some).ok_or_else(|| FlowRunnerError::Validation(format!("Invalid maxResults '{}'", n))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse::<u32>().map(Some).map_err(|_| FlowRunnerError::Validation(format!("Invalid maxResults '{}'", s))),
            Some(other) => Err(FlowRunnerError::Validation(format!("Invalid maxResults '{}'", other))),
        }
    }

    fn build_request(
        &self,
        ctx: &ActionContext,
    ) -> Result<CalendarRequest> {
        let team_id = ctx
            .team_id()
            .map(str::to_string)
            .or_else(|| text_value(self.config.value("teamId")))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FlowRunnerError::Validation("Team ID is required".to_string()))?;

        let attendees = match ctx.inputs().value("attendees") {
            Some(value) => string_list(Some(value)),
            None => string_list(self.config.value("attendees")),
        };

        Ok(CalendarRequest {
            team_id,
            operation: self.operation.clone(),
            calendar_id: text_value(self.config.value("calendarId")).filter(|c| !c.is_empty()).unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            summary: self.field(ctx, "summary"),
            description: self.field(ctx, "description"),
            start_date_time: self.field(ctx, START_DATE_TIME_KEY),
            end_date_time: self.field(ctx, END_DATE_TIME_KEY),
            location: self.field(ctx, "location"),
            attendees,
            event_id: self.field(ctx, "eventId"),
            time_min: text_value(self.config.value("timeMin")),
            time_max: text_value(self.config.value("timeMax")),
            max_results: self.max_results()?,
        })
    }
}

#[async_trait]
impl Action for GoogleCalendarAction {
    fn create(config: &Vars) -> Result<Self> {
        validate_config(config, &Self::schema())?;
        let operation = config.get::<String>("operation").filter(|o| !o.trim().is_empty()).ok_or_else(|| FlowRunnerError::Validation("Calendar operation is required".to_string()))?;

        Ok(GoogleCalendarAction {
            config: config.clone(),
            operation,
        })
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": { "type": ["string", "null"] },
                "calendarId": { "type": ["string", "null"] },
                "attendees": { "type": ["array", "string", "null"] },
                "maxResults": { "type": ["integer", "string", "null"] }
            }
        })
    }

    fn action_type(&self) -> NodeKind {
        NodeKind::GoogleCalendarAction
    }

    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput> {
        let request = self.build_request(ctx)?;
        debug!(nid = %ctx.nid(), operation = %request.operation, calendar_id = %request.calendar_id, "calendar call");

        let response = ctx.clients().calendar.call(request).await?;
        if !response.success {
            return Err(FlowRunnerError::ExternalCall(response.error.unwrap_or_else(|| "Calendar operation failed".to_string())));
        }

        let data = response.data.clone();
        Ok(ActionOutput::with_response(data, serde_json::to_value(&response)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubCalendar, Stubs};

    fn config() -> Vars {
        Vars::new()
            .with("operation", "createEvent")
            .with("summary", "Config summary")
            .with("location", "Room 1")
            .with("attendees", ["c@x.io"])
            .with("maxResults", "10")
    }

    #[test]
    fn test_operation_is_required() {
        let err = GoogleCalendarAction::create(&Vars::new().with("summary", "x")).unwrap_err();
        assert_eq!(err.to_string(), "Calendar operation is required");
    }

    #[tokio::test]
    async fn test_team_id_is_required() {
        let stubs = Stubs::new();
        let action = GoogleCalendarAction::create(&config()).unwrap();
        let err = action.run(&stubs.context("cal")).await.unwrap_err();
        assert_eq!(err, FlowRunnerError::Validation("Team ID is required".to_string()));
        assert!(stubs.calendar.requests().is_empty());
    }

    #[tokio::test]
    async fn test_inputs_override_config() {
        let stubs = Stubs::new().with_calendar(StubCalendar::ok(json!({"id": "evt-1"})));
        let action = GoogleCalendarAction::create(&config()).unwrap();
        let inputs = Vars::new().with("summary", "Team sync").with("startDateTime", "2026-10-20T00:00").with("attendees", "a@x.io,b@x.io");
        let ctx = stubs.context("cal").with_team_id(Some("team-1".to_string())).with_inputs(inputs);

        let output = action.run(&ctx).await.unwrap();
        assert_eq!(output.output_value, json!({"id": "evt-1"}));
        assert_eq!(output.last_response.unwrap()["success"], json!(true));

        let request = &stubs.calendar.requests()[0];
        assert_eq!(request.team_id, "team-1");
        assert_eq!(request.calendar_id, "primary");
        assert_eq!(request.summary.as_deref(), Some("Team sync"));
        assert_eq!(request.location.as_deref(), Some("Room 1"));
        assert_eq!(request.start_date_time.as_deref(), Some("2026-10-20T00:00"));
        assert_eq!(request.attendees, vec!["a@x.io", "b@x.io"]);
        assert_eq!(request.max_results, Some(10));
    }

    #[tokio::test]
    async fn test_team_id_falls_back_to_config() {
        let stubs = Stubs::new();
        let action = GoogleCalendarAction::create(&config().with("teamId", "team-cfg")).unwrap();
        action.run(&stubs.context("cal")).await.unwrap();
        assert_eq!(stubs.calendar.requests()[0].team_id, "team-cfg");
    }

    #[tokio::test]
    async fn test_unsuccessful_response_fails() {
        let stubs = Stubs::new().with_calendar(StubCalendar::rejecting("quota exceeded"));
        let action = GoogleCalendarAction::create(&config()).unwrap();
        let ctx = stubs.context("cal").with_team_id(Some("team-1".to_string()));
        let err = action.run(&ctx).await.unwrap_err();
        assert_eq!(err, FlowRunnerError::ExternalCall("quota exceeded".to_string()));
    }
}
