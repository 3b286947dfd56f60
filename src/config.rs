use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// default team identifier used by calendar nodes when a run does not supply one
    pub team_id: Option<String>,
    /// delay applied by node types without a dedicated handler, in milliseconds
    pub simulated_action_delay_ms: u64,
    /// visual pacing between traversal steps
    pub pacing: PacingConfig,
    /// collaborator endpoints
    pub endpoints: EndpointConfig,
    /// outbound http client settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// pause before each node is dispatched, in milliseconds
    pub before_node_ms: u64,
    /// pause after each node completes, in milliseconds
    pub after_node_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// base url that the email and calendar paths are joined onto
    pub base_url: String,
    /// email-send endpoint path
    pub email_path: String,
    /// calendar endpoint path
    pub calendar_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// request timeout in milliseconds
    pub timeout_ms: u64,
    /// headers sent with every api node request, overridden by node headers
    pub default_headers: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            team_id: None,
            simulated_action_delay_ms: 1000,
            pacing: PacingConfig::default(),
            endpoints: EndpointConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            email_path: "/api/email/send".to_string(),
            calendar_path: "/api/google-calendar".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            default_headers: HashMap::new(),
        }
    }
}

impl EndpointConfig {
    pub fn email_url(&self) -> String {
        join_url(&self.base_url, &self.email_path)
    }

    pub fn calendar_url(&self) -> String {
        join_url(&self.base_url, &self.calendar_path)
    }
}

fn join_url(
    base: &str,
    path: &str,
) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }
}
