//! Aggregate result of a windowed fan-out and the knobs that shape it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::partial::DetailError;

/// Default number of detail requests in flight per window.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// What the aggregating fan-out does with items whose detail fetch failed.
///
/// Failed items never appear in the sorted result list. `Report` keeps them
/// in [`FanoutReport::failures`]; `Drop` only counts and logs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Report,
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutOptions {
    pub window_size: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for FanoutOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Display name used to order aggregated results.
pub trait Named {
    fn name(&self) -> &str;
}

#[derive(Debug)]
pub struct FailedItem {
    pub source: String,
    pub error: DetailError,
}

/// Terminal value of an aggregating run.
#[derive(Debug)]
pub struct FanoutReport<T> {
    /// Successful results, sorted by name.
    pub items: Vec<T>,
    /// Failed items, in completion order (empty under `FailurePolicy::Drop`).
    pub failures: Vec<FailedItem>,
    /// Failed items that were dropped under `FailurePolicy::Drop`.
    pub dropped: usize,
    pub elapsed: Duration,
}

impl<T> FanoutReport<T> {
    /// Total number of failed items, reported or dropped.
    pub fn failed(&self) -> usize {
        self.failures.len() + self.dropped
    }
}
