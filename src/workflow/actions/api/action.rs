use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    FlowRunnerError, Result,
    clients::{HttpMethod, HttpRequest},
    common::Vars,
    runtime::ActionContext,
    workflow::{
        actions::{Action, ActionOutput, text_value, validate_config},
        node::NodeKind,
        template,
    },
};

use super::models::*;

const AUTHORIZATION_HEADER: &str = "Authorization";
const CONTENT_TYPE_HEADER: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ApiAction {
    url: String,
    method: HttpMethod,
    headers: BTreeMap<String, String>,
    body: Option<Value>,
    auth: AuthConfig,
}

impl ApiAction {
    fn parse_headers(headers: Option<Value>) -> Result<BTreeMap<String, String>> {
        let object = match headers {
            None | Some(Value::Null) => return Ok(BTreeMap::new()),
            Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(BTreeMap::new()),
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                _ => return Err(FlowRunnerError::Validation("Headers must be a JSON object".to_string())),
            },
            Some(Value::Object(map)) => map,
            Some(_) => return Err(FlowRunnerError::Validation("Headers must be a JSON object".to_string())),
        };

        Ok(object.into_iter().filter_map(|(k, v)| text_value(Some(&v)).map(|v| (k, v))).collect())
    }

    fn parse_body(body: Option<Value>) -> Option<Value> {
        match body {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) if raw.trim().is_empty() => None,
            // text that is not JSON is sent as a JSON string
            Some(Value::String(raw)) => Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw))),
            Some(value) => Some(value),
        }
    }

    /// Authorization header for the configured scheme, if any.
    fn auth_header(&self) -> Result<Option<(String, String)>> {
        if self.auth.auth_type == AuthType::None {
            return Ok(None);
        }

        let api_key = self.auth.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| FlowRunnerError::Validation("apiKey is required for api-key authorization".to_string()))?;
        let header_name = self.auth.header.as_deref().filter(|h| !h.is_empty()).unwrap_or(AUTHORIZATION_HEADER);

        let header_value = match self.auth.auth_type {
            AuthType::Bearer => format!("Bearer {}", api_key),
            AuthType::Basic => {
                let encoded = if api_key.contains(':') { STANDARD.encode(api_key.as_bytes()) } else { api_key.to_string() };
                format!("Basic {}", encoded)
            }
            AuthType::Custom => api_key.to_string(),
            AuthType::None => return Ok(None),
        };

        Ok(Some((header_name.to_string(), header_value)))
    }

    fn build_request(
        &self,
        ctx: &ActionContext,
    ) -> Result<HttpRequest> {
        let url = template::resolve_template(ctx.outputs(), &self.url)?;

        let mut headers = ctx.default_headers().clone();
        headers.insert(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string());

        if let Some((name, value)) = self.auth_header()? {
            headers.insert(name, value);
        }

        for (key, value) in &self.headers {
            headers.insert(key.clone(), template::resolve_template(ctx.outputs(), value)?);
        }

        let body = match (&self.body, self.method.has_body()) {
            (Some(body), true) => Some(template::resolve_json_value(ctx.outputs(), body)?),
            _ => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Action for ApiAction {
    fn create(config: &Vars) -> Result<Self> {
        let cfg: ApiConfig = serde_json::from_value(config.clone().into()).map_err(|e| FlowRunnerError::Validation(format!("invalid api config: {}", e)))?;
        let url = cfg.url.filter(|u| !u.trim().is_empty()).ok_or_else(|| FlowRunnerError::Validation("API URL is required".to_string()))?;
        validate_config(config, &Self::schema())?;

        let method = match cfg.method.as_deref() {
            None | Some("") => HttpMethod::default(),
            Some(m) => m.parse().map_err(|_| FlowRunnerError::Validation(format!("invalid method '{}'", m)))?,
        };

        Ok(ApiAction {
            url,
            method,
            headers: Self::parse_headers(cfg.headers)?,
            body: Self::parse_body(cfg.request_body),
            auth: cfg.auth.unwrap_or_default(),
        })
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["url"],
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Request URL, supports template variables like {{#nodeId.key#}}"
                },
                "method": {
                    "enum": ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "get", "post", "put", "patch", "delete", "head", "options", "", null],
                    "description": "HTTP request method, GET when unset"
                },
                "headers": {
                    "type": ["object", "string", "null"],
                    "description": "HTTP headers, values support template variables"
                },
                "requestBody": {
                    "description": "JSON body for POST/PUT/PATCH, strings support template variables"
                },
                "auth": {
                    "type": ["object", "null"],
                    "properties": {
                        "type": { "enum": ["none", "basic", "bearer", "custom"] },
                        "apiKey": { "type": ["string", "null"] },
                        "header": { "type": ["string", "null"] }
                    }
                }
            }
        })
    }

    fn action_type(&self) -> NodeKind {
        NodeKind::ApiAction
    }

    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput> {
        let request = self.build_request(ctx)?;
        debug!(nid = %ctx.nid(), method = %request.method.as_ref(), url = %request.url, "api request");

        let response = ctx.clients().http.request(request).await?;
        Ok(ActionOutput::with_response(response.clone(), response))
    }
}
