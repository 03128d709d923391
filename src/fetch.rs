//! The single-item fetch seam consumed by the batch orchestrator.

use crate::model::TabRecord;
use anyhow::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Fetches one tab record for one identifier.
///
/// Implementations must resolve to exactly one record or one error per call;
/// partial or streaming responses are not part of the contract.
pub trait TabFetcher: Send + Sync {
    fn fetch<'a>(&'a self, identifier: &'a str) -> BoxFuture<'a, Result<TabRecord>>;
}

impl<T: TabFetcher + ?Sized> TabFetcher for Arc<T> {
    fn fetch<'a>(&'a self, identifier: &'a str) -> BoxFuture<'a, Result<TabRecord>> {
        (**self).fetch(identifier)
    }
}

impl<T: TabFetcher + ?Sized> TabFetcher for &T {
    fn fetch<'a>(&'a self, identifier: &'a str) -> BoxFuture<'a, Result<TabRecord>> {
        (**self).fetch(identifier)
    }
}
