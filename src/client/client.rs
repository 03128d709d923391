//! HTTP client for the tab parsing service. Houses `HttpTabClient`, its error
//! type, and the [`TabFetcher`] implementation consumed by the batch
//! orchestrator.
//!
//! The HTTP stack is blocking, so every request runs on tokio's blocking pool
//! and async callers are never stalled by network I/O.

use crate::client::metrics::{FetchMetrics, FetchMetricsSnapshot};
use crate::client::options::{ClientOptions, TAB_LINES_PATH};
use crate::fetch::TabFetcher;
use crate::model::TabRecord;
use crate::runtime::config::{validate_url, ClientConfig};
use crate::runtime::telemetry::elapsed_millis;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use ureq::Agent;

const TAB_QUERY_KEY: &str = "url";
const DEFAULT_STATUS_MESSAGE: &str = "Failed to parse tab";

/// Failures classified by the HTTP client. Travels inside `anyhow::Error`
/// through the [`TabFetcher`] seam; recover it with `downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("URL is required")]
    MissingUrl,
    #[error("request timed out after {elapsed_ms}ms; the server took too long to respond")]
    Timeout { elapsed_ms: u64 },
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
    #[error("response exceeded the {limit} byte limit")]
    ResponseTooLarge { limit: usize },
    #[error("{0}")]
    Backend(String),
    #[error("request failed: {0}")]
    Transport(String),
}

#[derive(Clone)]
pub struct HttpTabClient {
    api_url: Arc<String>,
    agent: Agent,
    options: ClientOptions,
    metrics: Arc<FetchMetrics>,
}

impl TabFetcher for HttpTabClient {
    fn fetch<'a>(&'a self, identifier: &'a str) -> BoxFuture<'a, Result<TabRecord>> {
        Box::pin(self.parse_tab(identifier))
    }
}

impl HttpTabClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        Self::with_options(api_url, ClientOptions::default())
    }

    pub fn with_options(api_url: impl Into<String>, options: ClientOptions) -> Result<Self> {
        options.validate()?;

        let api_url = api_url.into();
        validate_url(&api_url)?;
        let api_url = api_url.trim().trim_end_matches('/').to_owned();

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(options.request_timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            api_url: Arc::new(api_url),
            agent,
            options,
            metrics: Arc::new(FetchMetrics::default()),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let options = ClientOptions {
            request_timeout: config.request_timeout(),
            max_response_body_bytes: config.max_response_body_bytes(),
            health_path: config.health_path().to_owned(),
            user_agent: config.user_agent().to_owned(),
            ..ClientOptions::default()
        };
        Self::with_options(config.api_url(), options)
    }

    /// Base URL of the service, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.api_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn metrics(&self) -> FetchMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Asks the service to parse the tab at `url` via the configured
    /// `tab_path`.
    ///
    /// Non-2xx answers surface the service's JSON `error` message when it sent
    /// one. A 2xx answer that carries an error block is also a failure. The
    /// default `/tab` endpoint answers with grouped blocks and joined text but
    /// no `lines`; use [`Self::parse_tab_lines`] for renderable line data.
    pub async fn parse_tab(&self, url: &str) -> Result<TabRecord> {
        self.parse_at(&self.options.tab_path, url).await
    }

    /// Same as [`Self::parse_tab`] against the line-level endpoint
    /// ([`TAB_LINES_PATH`]), whose records carry chord/lyric `lines`.
    pub async fn parse_tab_lines(&self, url: &str) -> Result<TabRecord> {
        self.parse_at(TAB_LINES_PATH, url).await
    }

    async fn parse_at(&self, path: &str, url: &str) -> Result<TabRecord> {
        if url.trim().is_empty() {
            return Err(ClientError::MissingUrl.into());
        }

        let start = Instant::now();
        let outcome = self.request_tab(path, url).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok(_) => {
                self.metrics.record_success(elapsed);
                tracing::debug!(
                    url,
                    path,
                    elapsed_ms = elapsed_millis(elapsed),
                    "tab parse completed"
                );
            }
            Err(err) => {
                if matches!(
                    err.downcast_ref::<ClientError>(),
                    Some(ClientError::Timeout { .. })
                ) {
                    self.metrics.record_timeout(elapsed);
                } else {
                    self.metrics.record_failure(elapsed);
                }
                tracing::warn!(
                    url,
                    path,
                    elapsed_ms = elapsed_millis(elapsed),
                    error = %err,
                    "tab parse failed"
                );
            }
        }

        outcome
    }

    /// Liveness check: returns the body of the health endpoint.
    pub async fn test_connection(&self) -> Result<String> {
        let (status, body) = self
            .get_text(&self.options.health_path, None)
            .await
            .context("failed to connect to API")?;

        if !is_success(status) {
            return Err(ClientError::Status {
                status,
                message: "health check failed".to_owned(),
            })
            .context("failed to connect to API");
        }

        Ok(body)
    }

    async fn request_tab(&self, path: &str, url: &str) -> Result<TabRecord> {
        let (status, body) = self
            .get_text(path, Some((TAB_QUERY_KEY, url.to_owned())))
            .await?;

        if !is_success(status) {
            let message =
                error_message(&body).unwrap_or_else(|| DEFAULT_STATUS_MESSAGE.to_owned());
            return Err(ClientError::Status { status, message }.into());
        }

        let record = TabRecord::from_json(&body).context("failed to decode tab response")?;
        if let Some(error) = record.backend_error() {
            return Err(ClientError::Backend(error.to_owned()).into());
        }

        Ok(record)
    }

    async fn get_text(
        &self,
        path: &str,
        query: Option<(&'static str, String)>,
    ) -> Result<(u16, String), ClientError> {
        let agent = self.agent.clone();
        let url = format!("{}{}", self.api_url, path);
        let user_agent = self.options.user_agent.clone();
        let limit = self.options.max_response_body_bytes;
        let start = Instant::now();

        let joined = tokio::task::spawn_blocking(move || {
            blocking_get(&agent, &url, query, &user_agent, limit)
        })
        .await;

        match joined {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(map_transport_error(err, start.elapsed(), limit)),
            Err(join_err) => Err(ClientError::Transport(format!(
                "HTTP worker task failed: {join_err}"
            ))),
        }
    }
}

fn blocking_get(
    agent: &Agent,
    url: &str,
    query: Option<(&'static str, String)>,
    user_agent: &str,
    limit: usize,
) -> Result<(u16, String), ureq::Error> {
    let mut request = agent.get(url).header("User-Agent", user_agent);
    if let Some((key, value)) = query {
        request = request.query(key, value);
    }

    let mut response = request.call()?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .with_config()
        .limit(limit as u64)
        .read_to_string()?;

    Ok((status, body))
}

fn map_transport_error(err: ureq::Error, elapsed: Duration, limit: usize) -> ClientError {
    match err {
        ureq::Error::Timeout(_) => ClientError::Timeout {
            elapsed_ms: elapsed_millis(elapsed),
        },
        ureq::Error::BodyExceedsLimit(_) => ClientError::ResponseTooLarge { limit },
        other => ClientError::Transport(other.to_string()),
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_owned)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
