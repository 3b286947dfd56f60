use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Method,
    header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::trace;

use crate::{
    FlowRunnerError, Result,
    clients::{HttpClient, HttpRequest},
};

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build().map_err(|e| FlowRunnerError::Config(format!("failed to build http client: {}", e)))
}

/// Decodes a response body as JSON, falling back to a JSON string for text bodies.
fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(build_client(timeout)?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn request(
        &self,
        request: HttpRequest,
    ) -> Result<Value> {
        let method = Method::from_bytes(request.method.as_ref().as_bytes()).map_err(|_| FlowRunnerError::Validation(format!("invalid method '{:?}'", request.method)))?;

        let mut headers = HeaderMap::new();
        for (key, value) in &request.headers {
            headers.insert(
                key.parse::<HeaderName>().map_err(|err| FlowRunnerError::Validation(err.to_string()))?,
                value.parse().map_err(|err: InvalidHeaderValue| FlowRunnerError::Validation(err.to_string()))?,
            );
        }
        if !headers.contains_key(reqwest::header::ACCEPT) {
            headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));
        }

        trace!(method = %request.method.as_ref(), url = %request.url, "sending http request");

        let mut builder = self.client.request(method, &request.url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let res = builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FlowRunnerError::ExternalCall(format!("HTTP error! status: {}", status.as_u16())));
        }

        let text = res.text().await?;
        Ok(decode_body(text))
    }
}

/// POSTs a JSON payload to a collaborator endpoint and decodes its JSON answer.
///
/// Error statuses still decode the body when it matches `R`, so the
/// endpoint's own `error` message reaches the node.
pub(crate) async fn post_json<T: Serialize, R: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    payload: &T,
) -> Result<R> {
    trace!(url = %url, "posting to collaborator endpoint");

    let res = client.post(url).json(payload).send().await?;
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<R>(&text) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(FlowRunnerError::ExternalCall(format!("HTTP error! status: {}", status.as_u16()))),
        Err(e) => Err(FlowRunnerError::ExternalCall(format!("invalid response from {}: {}", url, e))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::decode_body;

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(r#"{"ok": true}"#.to_string()), json!({"ok": true}));
        assert_eq!(decode_body("plain text".to_string()), json!("plain text"));
        assert_eq!(decode_body("  ".to_string()), json!(null));
    }
}
