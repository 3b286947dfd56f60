use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flowrunner::{
    CalendarClient, CalendarRequest, CalendarResponse, ChannelEvent, ChannelOptions, Config, EmailClient, EmailRequest, EmailResponse, FlowRunnerError, GraphStore, HttpClient,
    HttpRequest, NodeStatus, RunnerBuilder, StatusEvent, WorkflowModel,
};
use serde_json::{Value, json};

#[derive(Default)]
struct Recorder {
    http: Mutex<Vec<HttpRequest>>,
    email: Mutex<Vec<EmailRequest>>,
    calendar: Mutex<Vec<CalendarRequest>>,
}

#[async_trait]
impl HttpClient for Recorder {
    async fn request(
        &self,
        request: HttpRequest,
    ) -> flowrunner::Result<Value> {
        let fail = request.url.contains("/broken");
        self.http.lock().unwrap().push(request);
        if fail {
            return Err(FlowRunnerError::ExternalCall("HTTP error! status: 500".to_string()));
        }
        Ok(json!({"id": 42, "email": "ada@example.com"}))
    }
}

#[async_trait]
impl EmailClient for Recorder {
    async fn send(
        &self,
        request: EmailRequest,
    ) -> flowrunner::Result<EmailResponse> {
        self.email.lock().unwrap().push(request);
        Ok(EmailResponse {
            success: true,
            error: None,
        })
    }
}

#[async_trait]
impl CalendarClient for Recorder {
    async fn call(
        &self,
        request: CalendarRequest,
    ) -> flowrunner::Result<CalendarResponse> {
        self.calendar.lock().unwrap().push(request);
        Ok(CalendarResponse {
            success: true,
            data: json!({"eventId": "evt-1"}),
            error: None,
        })
    }
}

const WORKFLOW: &str = r#"{
  "nodes": [
    { "id": "start", "type": "start", "position": { "x": 0, "y": 0 } },
    { "id": "lookup", "type": "apiAction", "config": { "url": "https://api.example.com/users/1", "method": "GET" } },
    { "id": "fanout", "type": "branch" },
    { "id": "welcome", "type": "emailAction", "config": { "template": "welcome", "recipients": "{{#lookup.email#}}", "subject": "Hi" } },
    { "id": "broken", "type": "apiAction", "config": { "url": "https://api.example.com/broken", "method": "POST", "requestBody": { "user": "{{#lookup.id#}}" } } },
    { "id": "after-broken", "type": "end" },
    { "id": "title", "type": "constant", "config": { "value": "Onboarding", "targetField": "summary" } },
    { "id": "when", "type": "constant", "config": { "valueType": "datetime", "datetimeOption": "in_1_hour" } },
    { "id": "meeting", "type": "googleCalendarAction", "config": { "operation": "createEvent" } },
    { "id": "done", "type": "end" }
  ],
  "edges": [
    { "id": "e1", "source": "start", "target": "lookup" },
    { "id": "e2", "source": "lookup", "target": "fanout" },
    { "id": "e3", "source": "fanout", "target": "welcome" },
    { "id": "e4", "source": "fanout", "target": "broken" },
    { "id": "e5", "source": "broken", "target": "after-broken" },
    { "id": "e6", "source": "fanout", "target": "title" },
    { "id": "e7", "source": "fanout", "target": "when" },
    { "id": "e8", "source": "title", "target": "meeting" },
    { "id": "e9", "source": "when", "target": "meeting", "targetHandle": "start-input" },
    { "id": "e10", "source": "meeting", "target": "done" },
    { "id": "dangling", "source": "done", "target": "nowhere" }
  ]
}"#;

fn config() -> Config {
    Config::load_from_str(
        r#"
        team_id = "team-default"
        simulated_action_delay_ms = 0
        "#,
    )
    .unwrap()
}

#[tokio::test]
async fn run_end_to_end_against_graph_store() {
    let model = WorkflowModel::from_json(WORKFLOW).unwrap();
    let store = Arc::new(GraphStore::new(model.clone()));
    let recorder = Arc::new(Recorder::default());

    let runner = RunnerBuilder::new()
        .config(config())
        .sink(store.clone())
        .http_client(recorder.clone())
        .email_client(recorder.clone())
        .calendar_client(recorder.clone())
        .build()
        .unwrap();

    let failures = Arc::new(Mutex::new(Vec::new()));
    let seen = failures.clone();
    ChannelEvent::channel(runner.channel(), ChannelOptions::default()).unwrap().on_error(move |e| {
        if let StatusEvent::Node {
            nid,
            ..
        } = e
        {
            seen.lock().unwrap().push(nid.clone());
        }
    });

    let result = runner.run(&model, None).await.unwrap();

    assert_eq!(result.execution_path, vec!["start", "lookup", "fanout", "welcome", "broken", "title", "when", "meeting", "done"]);
    assert_eq!(result.status_of("broken"), Some(NodeStatus::Error));
    assert_eq!(result.status_of("after-broken"), None);
    assert_eq!(*failures.lock().unwrap(), vec!["broken".to_string()]);
    assert!(!result.succeeded());

    let emails = recorder.email.lock().unwrap().clone();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipients, vec!["ada@example.com".to_string()]);

    let posts = recorder.http.lock().unwrap().clone();
    assert_eq!(posts[1].body, Some(json!({"user": "42"})));

    let calendar = recorder.calendar.lock().unwrap().clone();
    assert_eq!(calendar[0].team_id, "team-default");
    assert_eq!(calendar[0].summary.as_deref(), Some("Onboarding"));
    assert!(calendar[0].start_date_time.is_some());

    let snapshot = store.snapshot();
    assert_eq!(snapshot.node("broken").unwrap().last_error.as_deref(), Some("HTTP error! status: 500"));
    assert_eq!(snapshot.node("meeting").unwrap().output_value, Some(json!({"eventId": "evt-1"})));
    assert_eq!(snapshot.node("lookup").unwrap().last_response, Some(json!({"id": 42, "email": "ada@example.com"})));
    assert_eq!(snapshot.node("after-broken").unwrap().status, NodeStatus::Initial);
    assert!(snapshot.edges.iter().all(|e| !e.animated));

    for nid in &result.execution_path {
        let status = snapshot.node(nid).unwrap().status;
        assert!(status == NodeStatus::Success || status == NodeStatus::Error, "{} ended as {:?}", nid, status);
    }

    runner.reset(&model);
    assert!(store.snapshot().nodes.iter().all(|n| n.status == NodeStatus::Initial));
}

#[tokio::test]
async fn run_without_start_node_is_refused() {
    let mut model = WorkflowModel::from_json(WORKFLOW).unwrap();
    model.nodes.retain(|n| n.node_type != "start");
    let store = Arc::new(GraphStore::new(model.clone()));
    let recorder = Arc::new(Recorder::default());

    let runner = RunnerBuilder::new().config(config()).sink(store.clone()).http_client(recorder.clone()).email_client(recorder.clone()).calendar_client(recorder).build().unwrap();

    assert_eq!(runner.run(&model, None).await.unwrap_err(), FlowRunnerError::NoStartNode);
    assert_eq!(store.snapshot(), model);
}
