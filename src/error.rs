//! Error types shared by the batch orchestrator and the alignment renderer.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised synchronously by the crate's public operations.
///
/// `InvalidInput` and `MalformedAlignment` abort the call that triggered them.
/// `Fetch` wraps a single item's failure; the batch orchestrator records those
/// per item instead of returning them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed alignment on line {line}, chord {token}: pre_spaces {pre_spaces} is out of range")]
    MalformedAlignment {
        line: usize,
        token: usize,
        pre_spaces: i64,
    },
    #[error(transparent)]
    Fetch(#[from] FetchFailure),
}

/// Opaque failure surfaced by a [`crate::TabFetcher`], preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FetchFailure {
    message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Captures the full context chain of an `anyhow` error as one message.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchFailure {}
