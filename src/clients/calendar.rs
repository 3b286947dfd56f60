use async_trait::async_trait;

use crate::{
    Result,
    clients::{CalendarClient, CalendarRequest, CalendarResponse, http::post_json},
};

/// [`CalendarClient`] that POSTs to the configured calendar endpoint.
#[derive(Debug, Clone)]
pub struct EndpointCalendarClient {
    url: String,
    client: reqwest::Client,
}

impl EndpointCalendarClient {
    pub fn new(
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl CalendarClient for EndpointCalendarClient {
    async fn call(
        &self,
        request: CalendarRequest,
    ) -> Result<CalendarResponse> {
        post_json(&self.client, &self.url, &request).await
    }
}
