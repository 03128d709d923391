//! Liveness reporting for the tab service and a background probe that keeps
//! the latest status available to callers.

use super::client::HttpTabClient;
use crate::runtime::telemetry::elapsed_millis;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const HTML_SUMMARY: &str = "API server is running";
const HTML_DOCTYPE: &str = "<!doctype html";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy {
        message: String,
        response_time_ms: u64,
        checked_at: DateTime<Utc>,
    },
    Unhealthy {
        error: String,
        checked_at: DateTime<Utc>,
    },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy { .. })
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        match self {
            HealthStatus::Healthy { checked_at, .. } | HealthStatus::Unhealthy { checked_at, .. } => {
                *checked_at
            }
        }
    }
}

impl HttpTabClient {
    /// Runs [`HttpTabClient::test_connection`] and folds the outcome into a
    /// [`HealthStatus`]. Never fails.
    pub async fn health_status(&self) -> HealthStatus {
        let start = Instant::now();
        let outcome = self.test_connection().await;
        let checked_at = Utc::now();

        match outcome {
            Ok(body) => HealthStatus::Healthy {
                message: summarize_body(body),
                response_time_ms: elapsed_millis(start.elapsed()),
                checked_at,
            },
            Err(err) => HealthStatus::Unhealthy {
                error: format!("{err:#}"),
                checked_at,
            },
        }
    }
}

fn summarize_body(body: String) -> String {
    let head = body.trim_start();
    let looks_like_html = head
        .get(..HTML_DOCTYPE.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HTML_DOCTYPE))
        || head
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<html"));
    if looks_like_html {
        HTML_SUMMARY.to_owned()
    } else {
        body.trim().to_owned()
    }
}

/// Periodic liveness checks published through a `watch` channel.
pub struct HealthProbe;

impl HealthProbe {
    /// Probes once immediately, then every `every`, until `shutdown` fires.
    /// The receiver holds `None` until the first probe completes. A probe in
    /// flight when `shutdown` fires is abandoned, not awaited.
    pub fn spawn(
        client: Arc<HttpTabClient>,
        every: Duration,
        shutdown: CancellationToken,
    ) -> (watch::Receiver<Option<HealthStatus>>, JoinHandle<()>) {
        let (status_tx, status_rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut was_healthy: Option<bool> = None;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        break;
                    }
                    _ = ticker.tick() => {
                        let status = tokio::select! {
                            _ = shutdown.cancelled() => break,
                            status = client.health_status() => status,
                        };
                        let healthy = status.is_healthy();
                        if was_healthy != Some(healthy) {
                            match &status {
                                HealthStatus::Healthy { response_time_ms, .. } => {
                                    tracing::info!(endpoint = client.endpoint(), response_time_ms, "tab service is healthy");
                                }
                                HealthStatus::Unhealthy { error, .. } => {
                                    tracing::warn!(endpoint = client.endpoint(), error = %error, "tab service is unhealthy");
                                }
                            }
                        }
                        was_healthy = Some(healthy);
                        if status_tx.send(Some(status)).is_err() {
                            tracing::debug!("health status receivers dropped");
                            break;
                        }
                    }
                }
            }

            tracing::info!("health probe stopped");
        });

        (status_rx, handle)
    }
}
