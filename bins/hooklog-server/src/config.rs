use std::collections::HashMap;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::error::ServerError;

#[derive(Parser, Debug)]
#[command(name = "hooklog-server", about = "GitHub webhook receiver backed by an in-memory stream")]
pub struct Cli {
    /// Path to the TOML config file. Defaults apply when omitted.
    #[arg(long, env = "HOOKLOG_CONFIG")]
    pub config: Option<String>,

    /// GitHub API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Webhook secret. Empty disables signature verification.
    #[arg(long, env = "GITHUB_SECRET", default_value = "", hide_env_values = true)]
    pub github_secret: String,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    /// How long to wait for in-flight HTTP requests on shutdown.
    #[serde(default = "default_exit_timeout_secs")]
    pub exit_timeout_secs: u64,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub hooks: HooksConfig,
}

#[derive(Debug, Deserialize)]
pub struct StreamConfig {
    /// Seconds between compaction passes, 0 disables them.
    #[serde(default = "default_compact_interval_secs")]
    pub compact_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// Request timeout in seconds, 0 means none.
    #[serde(default)]
    pub client_timeout_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct HooksConfig {
    #[serde(default)]
    pub issues: IssuesHookConfig,
}

#[derive(Debug, Deserialize)]
pub struct IssuesHookConfig {
    #[serde(default = "default_issues_topic")]
    pub topic: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Repository name to project resource path.
    #[serde(default)]
    pub projects: HashMap<String, String>,
}

fn default_addr() -> String {
    "0.0.0.0:10080".to_string()
}
fn default_exit_timeout_secs() -> u64 {
    5
}
fn default_compact_interval_secs() -> u64 {
    60
}
fn default_api_endpoint() -> String {
    hooklog_github::DEFAULT_API_ENDPOINT.to_string()
}
fn default_issues_topic() -> String {
    hooklog_hooks::ISSUES_TOPIC.to_string()
}
fn default_workers() -> usize {
    2
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            exit_timeout_secs: default_exit_timeout_secs(),
            stream: StreamConfig::default(),
            github: GithubConfig::default(),
            hooks: HooksConfig::default(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            compact_interval_secs: default_compact_interval_secs(),
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            client_timeout_secs: 0,
        }
    }
}

impl Default for IssuesHookConfig {
    fn default() -> Self {
        Self {
            topic: default_issues_topic(),
            workers: default_workers(),
            projects: HashMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|e| ServerError::Config { context: "parse", detail: format!("'{path}': {e}") })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn exit_timeout(&self) -> Duration {
        Duration::from_secs(self.exit_timeout_secs)
    }
}

impl StreamConfig {
    pub fn compact_interval(&self) -> Option<Duration> {
        (self.compact_interval_secs > 0).then(|| Duration::from_secs(self.compact_interval_secs))
    }
}

impl GithubConfig {
    pub fn client_timeout(&self) -> Option<Duration> {
        (self.client_timeout_secs > 0).then(|| Duration::from_secs(self.client_timeout_secs))
    }
}
