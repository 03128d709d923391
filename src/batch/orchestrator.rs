//! Sequential batch runner over any [`TabFetcher`].
//!
//! Identifiers are fetched one at a time, in input order, each fetch awaited to
//! completion before the next starts. A failed item is recorded once in the
//! `errors` partition and the loop moves on; only an empty input is rejected
//! outright, before any fetch is attempted.

use super::result::{BatchItemResult, BatchResult};
use crate::error::{FetchFailure, TabError};
use crate::fetch::TabFetcher;
use crate::runtime::telemetry::{elapsed_millis, Telemetry};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Error message recorded for items that were never started because the batch
/// was cancelled.
pub const CANCELLED_MESSAGE: &str = "batch cancelled before fetch";

pub struct BatchOrchestrator<F> {
    fetcher: F,
    telemetry: Arc<Telemetry>,
}

impl<F: TabFetcher> BatchOrchestrator<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_telemetry(fetcher, Arc::new(Telemetry::default()))
    }

    pub fn with_telemetry(fetcher: F, telemetry: Arc<Telemetry>) -> Self {
        Self { fetcher, telemetry }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns a clone of the telemetry handle for observability.
    pub fn telemetry(&self) -> Arc<Telemetry> {
        self.telemetry.clone()
    }

    /// Fetches every identifier once, in order, and partitions the outcomes.
    pub async fn process_batch<S: AsRef<str>>(
        &self,
        identifiers: &[S],
    ) -> Result<BatchResult, TabError> {
        self.process_batch_observed(identifiers, None, |_| {}).await
    }

    /// Like [`Self::process_batch`], but stops starting new fetches once
    /// `shutdown` is cancelled. Items that never started are recorded as
    /// failures with [`CANCELLED_MESSAGE`]; an in-flight fetch is awaited.
    pub async fn process_batch_cancellable<S: AsRef<str>>(
        &self,
        identifiers: &[S],
        shutdown: &CancellationToken,
    ) -> Result<BatchResult, TabError> {
        self.process_batch_observed(identifiers, Some(shutdown), |_| {})
            .await
    }

    /// Full form: optional cancellation plus an observer invoked after each
    /// item is recorded, in ascending index order.
    pub async fn process_batch_observed<S, O>(
        &self,
        identifiers: &[S],
        shutdown: Option<&CancellationToken>,
        mut observer: O,
    ) -> Result<BatchResult, TabError>
    where
        S: AsRef<str>,
        O: FnMut(&BatchItemResult),
    {
        if identifiers.is_empty() {
            return Err(TabError::InvalidInput(
                "identifiers must not be empty".to_owned(),
            ));
        }

        let total = identifiers.len();
        let started = Instant::now();
        let mut results = Vec::new();
        let mut errors = Vec::new();
        let mut cancelled = 0usize;

        tracing::debug!(total, "starting batch");

        for (index, identifier) in identifiers.iter().enumerate() {
            let identifier = identifier.as_ref();

            let item = if shutdown.is_some_and(CancellationToken::is_cancelled) {
                cancelled += 1;
                BatchItemResult::failed(index, identifier, FetchFailure::new(CANCELLED_MESSAGE))
            } else {
                self.fetch_one(index, identifier).await
            };

            observer(&item);

            if item.success() {
                results.push(item);
            } else {
                errors.push(item);
            }
        }

        let batch = BatchResult::new(results, errors, total);
        self.telemetry
            .record_batch(batch.successful_count(), batch.failed_count(), cancelled);

        tracing::info!(
            total,
            successful = batch.successful_count(),
            failed = batch.failed_count(),
            cancelled,
            elapsed_ms = elapsed_millis(started.elapsed()),
            "batch completed"
        );

        Ok(batch)
    }

    async fn fetch_one(&self, index: usize, identifier: &str) -> BatchItemResult {
        let start = Instant::now();

        match self.fetcher.fetch(identifier).await {
            Ok(record) => {
                tracing::debug!(
                    index,
                    identifier,
                    elapsed_ms = elapsed_millis(start.elapsed()),
                    "tab fetched"
                );
                BatchItemResult::succeeded(index, identifier, record)
            }
            Err(err) => {
                let failure = FetchFailure::from_error(&err);
                tracing::warn!(
                    index,
                    identifier,
                    error = %failure,
                    "tab fetch failed; continuing batch"
                );
                BatchItemResult::failed(index, identifier, failure)
            }
        }
    }
}
