//! Collaborator contracts the runner calls out to.
//!
//! Each external side effect (generic HTTP, email send, calendar mutation)
//! sits behind an async trait so hosts can swap in their own transport.
//! The reqwest-backed implementations talk to the endpoints in [`Config`].

mod calendar;
mod email;
mod http;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Config, Result};

pub use calendar::EndpointCalendarClient;
pub use email::EndpointEmailClient;
pub use http::ReqwestHttpClient;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

/// Generic HTTP collaborator used by `apiAction` nodes.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends the request and returns the decoded response body.
    ///
    /// Non-2xx responses are errors. Bodies that are not JSON come back as a
    /// JSON string; an empty body is `null`.
    async fn request(
        &self,
        request: HttpRequest,
    ) -> Result<Value>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub template: String,
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub custom_data: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EmailResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Email-send collaborator used by `emailAction` nodes.
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send(
        &self,
        request: EmailRequest,
    ) -> Result<EmailResponse>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRequest {
    #[serde(rename = "team_id")]
    pub team_id: String,
    pub operation: String,
    pub calendar_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub event_id: Option<String>,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CalendarResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// Calendar collaborator used by `googleCalendarAction` nodes.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn call(
        &self,
        request: CalendarRequest,
    ) -> Result<CalendarResponse>;
}

/// The set of external collaborators a run dispatches to.
#[derive(Clone)]
pub struct Collaborators {
    pub http: Arc<dyn HttpClient>,
    pub email: Arc<dyn EmailClient>,
    pub calendar: Arc<dyn CalendarClient>,
}

impl Collaborators {
    pub fn new(
        http: Arc<dyn HttpClient>,
        email: Arc<dyn EmailClient>,
        calendar: Arc<dyn CalendarClient>,
    ) -> Self {
        Self {
            http,
            email,
            calendar,
        }
    }

    /// reqwest-backed collaborators pointed at the configured endpoints
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http::build_client(Duration::from_millis(config.http.timeout_ms))?;

        Ok(Self {
            http: Arc::new(ReqwestHttpClient::with_client(client.clone())),
            email: Arc::new(EndpointEmailClient::new(config.endpoints.email_url(), client.clone())),
            calendar: Arc::new(EndpointCalendarClient::new(config.endpoints.calendar_url(), client)),
        })
    }
}
