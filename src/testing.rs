//! Stub collaborators and small graph builders shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    CalendarClient, CalendarRequest, CalendarResponse, Collaborators, EdgeModel, EmailClient, EmailRequest, EmailResponse, FlowRunnerError, HttpClient, HttpRequest, NodeModel, NodeStatus,
    Result, StatusSink, WorkflowModel,
    runtime::{ActionContext, NodeUpdate},
};

pub(crate) struct StubHttp {
    requests: Mutex<Vec<HttpRequest>>,
    response: Result<Value>,
}

impl StubHttp {
    pub fn ok(response: Value) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Ok(response),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Err(FlowRunnerError::ExternalCall(message.to_string())),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubHttp {
    async fn request(
        &self,
        request: HttpRequest,
    ) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        self.response.clone()
    }
}

pub(crate) struct StubEmail {
    requests: Mutex<Vec<EmailRequest>>,
    response: EmailResponse,
}

impl StubEmail {
    pub fn ok() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: EmailResponse {
                success: true,
                error: None,
            },
        }
    }

    pub fn rejecting(error: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: EmailResponse {
                success: false,
                error: Some(error.to_string()),
            },
        }
    }

    pub fn requests(&self) -> Vec<EmailRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailClient for StubEmail {
    async fn send(
        &self,
        request: EmailRequest,
    ) -> Result<EmailResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

pub(crate) struct StubCalendar {
    requests: Mutex<Vec<CalendarRequest>>,
    response: CalendarResponse,
}

impl StubCalendar {
    pub fn ok(data: Value) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: CalendarResponse {
                success: true,
                data,
                error: None,
            },
        }
    }

    pub fn rejecting(error: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: CalendarResponse {
                success: false,
                data: Value::Null,
                error: Some(error.to_string()),
            },
        }
    }

    pub fn requests(&self) -> Vec<CalendarRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarClient for StubCalendar {
    async fn call(
        &self,
        request: CalendarRequest,
    ) -> Result<CalendarResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

/// One stub per collaborator, kept so tests can inspect what was sent.
pub(crate) struct Stubs {
    pub http: Arc<StubHttp>,
    pub email: Arc<StubEmail>,
    pub calendar: Arc<StubCalendar>,
}

impl Stubs {
    pub fn new() -> Self {
        Self {
            http: Arc::new(StubHttp::ok(Value::Null)),
            email: Arc::new(StubEmail::ok()),
            calendar: Arc::new(StubCalendar::ok(Value::Null)),
        }
    }

    pub fn with_http(
        mut self,
        http: StubHttp,
    ) -> Self {
        self.http = Arc::new(http);
        self
    }

    pub fn with_email(
        mut self,
        email: StubEmail,
    ) -> Self {
        self.email = Arc::new(email);
        self
    }

    pub fn with_calendar(
        mut self,
        calendar: StubCalendar,
    ) -> Self {
        self.calendar = Arc::new(calendar);
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(self.http.clone(), self.email.clone(), self.calendar.clone())
    }

    pub fn context(
        &self,
        nid: &str,
    ) -> ActionContext {
        ActionContext::new(nid, self.collaborators())
    }
}

/// Context with default stubs for actions that make no external call.
pub(crate) fn context(nid: &str) -> ActionContext {
    Stubs::new().context(nid)
}

/// Every status write in arrival order.
#[derive(Default)]
pub(crate) struct RecordingSink {
    nodes: Mutex<Vec<(String, NodeStatus, NodeUpdate)>>,
    edges: Mutex<Vec<(String, bool)>>,
}

impl RecordingSink {
    pub fn node_writes(&self) -> Vec<(String, NodeStatus, NodeUpdate)> {
        self.nodes.lock().unwrap().clone()
    }

    pub fn edge_writes(&self) -> Vec<(String, bool)> {
        self.edges.lock().unwrap().clone()
    }

    /// Statuses written for one node, in order.
    pub fn statuses_of(
        &self,
        nid: &str,
    ) -> Vec<NodeStatus> {
        self.nodes.lock().unwrap().iter().filter(|(id, ..)| id == nid).map(|(_, status, _)| *status).collect()
    }
}

impl StatusSink for RecordingSink {
    fn update_node_status(
        &self,
        nid: &str,
        status: NodeStatus,
        update: NodeUpdate,
    ) {
        self.nodes.lock().unwrap().push((nid.to_string(), status, update));
    }

    fn update_edge_status(
        &self,
        eid: &str,
        animated: bool,
    ) {
        self.edges.lock().unwrap().push((eid.to_string(), animated));
    }
}

pub(crate) fn node(
    id: &str,
    node_type: &str,
) -> NodeModel {
    NodeModel::new(id, node_type)
}

pub(crate) fn edge(
    source: &str,
    target: &str,
) -> EdgeModel {
    EdgeModel::new(format!("{}-{}", source, target), source, target)
}

pub(crate) fn graph(
    nodes: Vec<NodeModel>,
    edges: Vec<EdgeModel>,
) -> WorkflowModel {
    WorkflowModel::new(nodes, edges)
}
