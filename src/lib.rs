pub mod batch;
pub mod client;
pub mod error;
pub mod fetch;
pub mod model;
pub mod render;
pub mod runtime;

pub use batch::{BatchItemResult, BatchOrchestrator, BatchResult, ItemOutcome};
pub use client::{ClientError, ClientOptions, HealthProbe, HealthStatus, HttpTabClient};
pub use error::{FetchFailure, TabError};
pub use fetch::TabFetcher;
pub use model::{ChordToken, CombinedLine, TabBlock, TabRecord};
pub use render::{render, render_chord_row, TextBlock};
pub use runtime::config::{ClientConfig, ClientConfigBuilder, ClientConfigParams, Environment};
pub use runtime::telemetry::{init_tracing, Telemetry, TelemetrySnapshot};
