use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Bearer,
    Custom,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(rename = "type", default)]
    pub auth_type: AuthType,
    #[serde(default)]
    pub api_key: Option<String>,
    /// header name, defaults to `Authorization`
    #[serde(default)]
    pub header: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    /// object, or a JSON object encoded as a string
    #[serde(default)]
    pub headers: Option<Value>,
    /// JSON value, or a string holding JSON or plain text
    #[serde(default)]
    pub request_body: Option<Value>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}
