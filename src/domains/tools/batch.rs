//! Batch executor for tools that apply one action to many items.
//!
//! Items are processed one after another (Anki serves one request at a
//! time) and independently: a failed item is recorded and the loop moves on.
//! A batch with failures is still a successful tool call; the outcome
//! carries the per-item detail.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};

use super::envelope::ErrorDetail;

/// Result for a single batch item.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct BatchItemResult {
    /// Position of the item in the input.
    pub index: usize,
    /// Identifier of the item (note id, front text, model name, ...).
    pub item: Value,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Aggregated outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct BatchOutcome {
    pub total_attempted: usize,
    pub succeeded_count: usize,
    pub failed_count: usize,
    /// Per-item results in input order.
    pub results: Vec<BatchItemResult>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the next item's outcome.
    pub fn record(&mut self, item: Value, outcome: Result<Value, ErrorDetail>) {
        let index = self.results.len();
        self.total_attempted += 1;
        let entry = match outcome {
            Ok(result) => {
                self.succeeded_count += 1;
                BatchItemResult {
                    index,
                    item,
                    success: true,
                    result: (!result.is_null()).then_some(result),
                    error: None,
                }
            }
            Err(error) => {
                self.failed_count += 1;
                BatchItemResult {
                    index,
                    item,
                    success: false,
                    result: None,
                    error: Some(error),
                }
            }
        };
        self.results.push(entry);
    }

    /// Successful items.
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchItemResult> {
        self.results.iter().filter(|r| r.success)
    }

    /// Failed items.
    pub fn failed(&self) -> impl Iterator<Item = &BatchItemResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// One-line summary, e.g. "3 of 4 succeeded, 1 failed".
    pub fn summary(&self) -> String {
        format!(
            "{} of {} succeeded, {} failed",
            self.succeeded_count, self.total_attempted, self.failed_count
        )
    }
}

/// Run `op` over every item in order and aggregate the outcomes.
///
/// `key` extracts the identifier recorded for each item.
pub async fn run_batch<I, K, F, Fut>(items: Vec<I>, key: K, mut op: F) -> BatchOutcome
where
    K: Fn(&I) -> Value,
    F: FnMut(I) -> Fut,
    Fut: Future<Output = Result<Value, ErrorDetail>>,
{
    let mut outcome = BatchOutcome::new();

    for item in items {
        let id = key(&item);
        let result = op(item).await;
        match &result {
            Ok(_) => debug!("Batch item {} succeeded", id),
            Err(e) => warn!("Batch item {} failed: {}", id, e.message),
        }
        outcome.record(id, result);
    }

    outcome
}
