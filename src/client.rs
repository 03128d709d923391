//! HTTP access to the tab parsing service: the client, its options and
//! metrics, and the health probe.

pub mod client;
pub mod health;
pub(crate) mod metrics;
pub mod options;

pub use client::{ClientError, HttpTabClient};
pub use health::{HealthProbe, HealthStatus};
pub use metrics::FetchMetricsSnapshot;
pub use options::ClientOptions;
