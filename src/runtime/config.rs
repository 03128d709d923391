use crate::client::options::{
    DEFAULT_HEALTH_PATH, DEFAULT_HTTP_BODY_LIMIT_BYTES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
use anyhow::{bail, Context, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;
const DEVELOPMENT_API_URL: &str = "http://localhost:5000";
const HOSTED_API_URL: &str = "https://ultimate-api-production.up.railway.app";

pub const ENV_PRESET: &str = "TABFETCH_ENV";
pub const ENV_API_URL: &str = "TABFETCH_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TABFETCH_TIMEOUT_SECS";
pub const ENV_HEALTH_INTERVAL_SECS: &str = "TABFETCH_HEALTH_INTERVAL_SECS";

/// Deployment presets that pick the default service URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn default_api_url(self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_API_URL,
            Environment::Staging | Environment::Production => HOSTED_API_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("unknown environment '{other}'; expected development, staging or production"),
        }
    }
}

/// Connection settings for the tab service client.
///
/// All instances must be constructed via [`ClientConfig::builder`] or [`ClientConfig::new`]
/// so invariants are validated before any consumer observes the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_url: String,
    request_timeout: Duration,
    health_path: String,
    health_interval: Duration,
    max_response_body_bytes: usize,
    user_agent: String,
}

pub struct ClientConfigParams {
    pub api_url: String,
    pub request_timeout: Duration,
    pub health_path: String,
    pub health_interval: Duration,
    pub max_response_body_bytes: usize,
    pub user_agent: String,
}

impl ClientConfig {
    /// Returns a builder to incrementally construct and validate a configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Builder seeded with the preset's service URL.
    pub fn for_environment(environment: Environment) -> ClientConfigBuilder {
        ClientConfigBuilder::default().api_url(environment.default_api_url())
    }

    /// Constructs a configuration directly from the provided values.
    pub fn new(params: ClientConfigParams) -> Result<Self> {
        let ClientConfigParams {
            api_url,
            request_timeout,
            health_path,
            health_interval,
            max_response_body_bytes,
            user_agent,
        } = params;

        let config = Self {
            api_url: trimmed_string(api_url).trim_end_matches('/').to_owned(),
            request_timeout,
            health_path: trimmed_string(health_path),
            health_interval,
            max_response_body_bytes,
            user_agent: trimmed_string(user_agent),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from `TABFETCH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a caller-supplied variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match non_empty(lookup(ENV_PRESET)) {
            Some(value) => value
                .parse::<Environment>()
                .with_context(|| format!("invalid {ENV_PRESET}"))?,
            None => Environment::default(),
        };

        let mut builder = Self::for_environment(environment);
        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            builder = builder.api_url(url);
        }
        if let Some(secs) = non_empty(lookup(ENV_TIMEOUT_SECS)) {
            builder = builder.request_timeout(parse_secs(&secs, ENV_TIMEOUT_SECS)?);
        }
        if let Some(secs) = non_empty(lookup(ENV_HEALTH_INTERVAL_SECS)) {
            builder = builder.health_interval(parse_secs(&secs, ENV_HEALTH_INTERVAL_SECS)?);
        }

        let config = builder.build()?;
        tracing::debug!(
            environment = %environment,
            api_url = config.api_url(),
            "loaded client configuration"
        );
        Ok(config)
    }

    /// Base URL of the service, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Per-request timeout applied to the HTTP client.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Path probed by the liveness check.
    pub fn health_path(&self) -> &str {
        &self.health_path
    }

    /// Interval between background health probes.
    pub fn health_interval(&self) -> Duration {
        self.health_interval
    }

    /// Maximum allowed HTTP response body bytes.
    pub fn max_response_body_bytes(&self) -> usize {
        self.max_response_body_bytes
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Performs validation on an existing configuration instance.
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.api_url)?;
        ensure_not_empty(&self.user_agent, "user_agent")?;

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }

        if !self.health_path.starts_with('/') {
            bail!("health_path must start with /");
        }

        if self.health_interval.is_zero() {
            bail!("health_interval must be greater than 0");
        }

        if self.max_response_body_bytes == 0 {
            bail!("max_response_body_bytes must be greater than 0");
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ClientConfigBuilder {
    api_url: Option<String>,
    request_timeout: Option<Duration>,
    health_path: Option<String>,
    health_interval: Option<Duration>,
    max_response_body_bytes: Option<usize>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = Some(path.into());
        self
    }

    pub fn health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = Some(interval);
        self
    }

    pub fn max_response_body_bytes(mut self, bytes: usize) -> Self {
        self.max_response_body_bytes = Some(bytes);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let params = ClientConfigParams {
            api_url: self.api_url.context("api_url is required")?,
            request_timeout: self
                .request_timeout
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            health_path: self
                .health_path
                .unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_owned()),
            health_interval: self
                .health_interval
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_HEALTH_INTERVAL_SECS)),
            max_response_body_bytes: self
                .max_response_body_bytes
                .unwrap_or(DEFAULT_HTTP_BODY_LIMIT_BYTES),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        };

        ClientConfig::new(params)
    }
}

fn trimmed_string(value: String) -> String {
    value.trim().to_owned()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_secs(value: &str, key: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds, got '{value}'"))?;
    Ok(Duration::from_secs(secs))
}

fn ensure_not_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} cannot be empty");
    }
    Ok(())
}

pub(crate) fn validate_url(url: &str) -> Result<()> {
    let url = url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("api_url must start with http:// or https://");
    }
    Ok(())
}
