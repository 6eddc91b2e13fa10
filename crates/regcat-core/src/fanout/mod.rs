//! Windowed fan-out over large item lists.
//!
//! The input list is cut into consecutive windows. Each window becomes one
//! batch of [`RequestUnit`]s drained through [`PartialResults`] before the
//! next window is submitted, so at most `window_size` requests are ever in
//! flight against the registry.
//!
//! Two flavours:
//! - [`aggregate`] reports progress before every window and finishes with a
//!   name-sorted [`FanoutReport`].
//! - [`stream_outcomes`] yields each [`PartialOutcome`] as it arrives, with no
//!   accumulation and no final sort.
//!
//! Dropping either stream cancels the window in flight; later windows are
//! never started.

mod report;
mod window;

use async_stream::stream;
use futures::{Stream, StreamExt};
use std::time::Instant;

use crate::partial::{PartialOutcome, PartialResults, RequestUnit};

pub use report::{
    FailedItem, FailurePolicy, FanoutOptions, FanoutReport, Named, DEFAULT_WINDOW_SIZE,
};
pub use window::{partition, window_count, Window, WindowProgress};

/// Event emitted by [`aggregate`].
#[derive(Debug)]
pub enum FanoutEvent<T> {
    /// A window is about to be submitted.
    Window(WindowProgress),
    /// All windows are drained; always the last event.
    Finished(FanoutReport<T>),
}

/// Runs `detail_fetch` over every item, window by window, and finishes with
/// the successful results sorted by [`Named::name`].
pub fn aggregate<I, T, F>(
    items: Vec<I>,
    detail_fetch: F,
    options: FanoutOptions,
) -> impl Stream<Item = FanoutEvent<T>> + Send
where
    I: Send + Sync,
    T: Named + Send + 'static,
    F: Fn(&I) -> RequestUnit<T> + Send,
{
    stream! {
        let started = Instant::now();
        let total = items.len();
        let windows = window_count(total, options.window_size);
        let mut succeeded: Vec<T> = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut dropped = 0usize;

        for window in partition(total, options.window_size) {
            let progress = WindowProgress::new(window, windows, total, started.elapsed().as_secs_f64());
            yield FanoutEvent::Window(progress);

            tracing::debug!(offset = window.offset, len = window.len, "window submitted");
            let mut outcomes = PartialResults::submit(items[window.range()].iter().map(&detail_fetch));
            while let Some(outcome) = outcomes.next().await {
                match outcome.result {
                    Ok(value) => succeeded.push(value),
                    Err(error) => match options.failure_policy {
                        FailurePolicy::Report => failures.push(FailedItem {
                            source: outcome.source,
                            error,
                        }),
                        FailurePolicy::Drop => {
                            tracing::warn!(source = %outcome.source, error = %error, "dropping failed item");
                            dropped += 1;
                        }
                    },
                }
            }
        }

        succeeded.sort_by(|a, b| a.name().cmp(b.name()));
        let report = FanoutReport {
            items: succeeded,
            failures,
            dropped,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            items = report.items.len(),
            failed = report.failed(),
            windows,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "fan-out finished"
        );
        yield FanoutEvent::Finished(report);
    }
}

/// Runs `detail_fetch` over every item, window by window, yielding each
/// outcome as soon as it completes. Failed outcomes are yielded too; callers
/// must inspect `PartialOutcome::result`.
pub fn stream_outcomes<I, T, F>(
    items: Vec<I>,
    detail_fetch: F,
    window_size: usize,
) -> impl Stream<Item = PartialOutcome<T>> + Send
where
    I: Send + Sync,
    T: Send + 'static,
    F: Fn(&I) -> RequestUnit<T> + Send,
{
    stream! {
        for window in partition(items.len(), window_size) {
            tracing::debug!(offset = window.offset, len = window.len, "window submitted");
            let mut outcomes = PartialResults::submit(items[window.range()].iter().map(&detail_fetch));
            while let Some(outcome) = outcomes.next().await {
                yield outcome;
            }
        }
    }
}
