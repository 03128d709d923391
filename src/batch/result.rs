use crate::error::FetchFailure;
use crate::model::TabRecord;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Outcome of fetching a single identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Success(TabRecord),
    Failure(FetchFailure),
}

/// One entry of a [`BatchResult`], tagged with its original input position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemResult {
    index: usize,
    identifier: String,
    outcome: ItemOutcome,
}

impl BatchItemResult {
    pub fn succeeded(index: usize, identifier: impl Into<String>, data: TabRecord) -> Self {
        Self {
            index,
            identifier: identifier.into(),
            outcome: ItemOutcome::Success(data),
        }
    }

    pub fn failed(index: usize, identifier: impl Into<String>, error: FetchFailure) -> Self {
        Self {
            index,
            identifier: identifier.into(),
            outcome: ItemOutcome::Failure(error),
        }
    }

    /// Position of the identifier in the input list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn outcome(&self) -> &ItemOutcome {
        &self.outcome
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Success(_))
    }

    pub fn data(&self) -> Option<&TabRecord> {
        match &self.outcome {
            ItemOutcome::Success(data) => Some(data),
            ItemOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchFailure> {
        match &self.outcome {
            ItemOutcome::Success(_) => None,
            ItemOutcome::Failure(error) => Some(error),
        }
    }

    pub fn into_outcome(self) -> ItemOutcome {
        self.outcome
    }
}

impl Serialize for BatchItemResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchItemResult", 4)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("identifier", &self.identifier)?;
        state.serialize_field("success", &self.success())?;
        match &self.outcome {
            ItemOutcome::Success(data) => state.serialize_field("data", data)?,
            ItemOutcome::Failure(error) => state.serialize_field("error", error)?,
        }
        state.end()
    }
}

/// Aggregate outcome of a batch.
///
/// `results` and `errors` partition the input by outcome and are each ordered
/// by ascending original index. Only the orchestrator builds values of this
/// type, so `successful_count() + failed_count() == total()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    results: Vec<BatchItemResult>,
    errors: Vec<BatchItemResult>,
    total: usize,
}

impl BatchResult {
    pub(crate) fn new(
        results: Vec<BatchItemResult>,
        errors: Vec<BatchItemResult>,
        total: usize,
    ) -> Self {
        debug_assert_eq!(results.len() + errors.len(), total);
        Self {
            results,
            errors,
            total,
        }
    }

    pub fn results(&self) -> &[BatchItemResult] {
        &self.results
    }

    pub fn errors(&self) -> &[BatchItemResult] {
        &self.errors
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn successful_count(&self) -> usize {
        self.results.len()
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every item, successes and failures interleaved back into input order.
    pub fn in_input_order(&self) -> Vec<&BatchItemResult> {
        let mut items: Vec<&BatchItemResult> =
            self.results.iter().chain(self.errors.iter()).collect();
        items.sort_by_key(|item| item.index);
        items
    }

    pub fn into_parts(self) -> (Vec<BatchItemResult>, Vec<BatchItemResult>) {
        (self.results, self.errors)
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchResult", 5)?;
        state.serialize_field("results", &self.results)?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("successful_count", &self.successful_count())?;
        state.serialize_field("failed_count", &self.failed_count())?;
        state.end()
    }
}
