//! Ordered batch retrieval: one fetch per identifier, strictly sequential,
//! with per-item failure isolation and aggregate accounting.

pub mod orchestrator;
pub mod result;

pub use orchestrator::{BatchOrchestrator, CANCELLED_MESSAGE};
pub use result::{BatchItemResult, BatchResult, ItemOutcome};
