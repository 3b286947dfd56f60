use async_trait::async_trait;

use crate::{
    Result,
    clients::{EmailClient, EmailRequest, EmailResponse, http::post_json},
};

/// [`EmailClient`] that POSTs to the configured email-send endpoint.
#[derive(Debug, Clone)]
pub struct EndpointEmailClient {
    url: String,
    client: reqwest::Client,
}

impl EndpointEmailClient {
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
impl EmailClient for EndpointEmailClient {
    async fn send(
        &self,
        request: EmailRequest,
    ) -> Result<EmailResponse> {
        post_json(&self.client, &self.url, &request).await
    }
}
