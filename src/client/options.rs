//! Configurable knobs for the HTTP client along with validation helpers so
//! callers can reason about timeouts and response size limits.

use anyhow::{bail, Result};
use std::time::Duration;

pub const DEFAULT_HTTP_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_HEALTH_PATH: &str = "/";
/// Grouped-blocks endpoint: `blocks`, `lyrics_text` and `tabs_text`.
pub const DEFAULT_TAB_PATH: &str = "/tab";
/// Line-level endpoint: the record wrapped in `tab`, with `lines`.
pub const TAB_LINES_PATH: &str = "/tab/v1";
pub const DEFAULT_USER_AGENT: &str = concat!("tabfetch/", env!("CARGO_PKG_VERSION"));
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    pub max_response_body_bytes: usize,
    pub tab_path: String,
    pub health_path: String,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_response_body_bytes: DEFAULT_HTTP_BODY_LIMIT_BYTES,
            tab_path: DEFAULT_TAB_PATH.to_owned(),
            health_path: DEFAULT_HEALTH_PATH.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ClientOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }
        if self.max_response_body_bytes == 0 {
            bail!("max_response_body_bytes must be greater than 0");
        }
        if !self.tab_path.starts_with('/') {
            bail!("tab_path must start with /");
        }
        if !self.health_path.starts_with('/') {
            bail!("health_path must start with /");
        }
        if self.user_agent.trim().is_empty() {
            bail!("user_agent cannot be empty");
        }
        Ok(())
    }
}
