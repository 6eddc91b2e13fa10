//! Completion-ordered partial results.
//!
//! [`PartialResults`] takes a batch of [`RequestUnit`]s, starts every one of
//! them as its own tokio task, and then hands back their outcomes one at a
//! time in the order they actually finish. A slow unit never holds back one
//! that is already done, and a failing unit shows up as a failed
//! [`PartialOutcome`] rather than ending the stream.
//!
//! Dropping a `PartialResults` aborts whatever is still pending.

mod error;

use futures::future::BoxFuture;
use futures::Stream;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::task::{self, JoinError, JoinSet};

pub use error::DetailError;

/// One detail request, tagged with the item it was built from.
pub struct RequestUnit<T> {
    source: String,
    future: BoxFuture<'static, Result<T, DetailError>>,
}

impl<T> RequestUnit<T> {
    pub fn new<F, E>(source: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<DetailError>,
    {
        Self {
            source: source.into(),
            future: Box::pin(async move { future.await.map_err(Into::into) }),
        }
    }

    /// Name of the originating item.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<T> std::fmt::Debug for RequestUnit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestUnit")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Terminal result of one unit.
#[derive(Debug)]
pub struct PartialOutcome<T> {
    pub source: String,
    pub result: Result<T, DetailError>,
}

impl<T> PartialOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Stream of outcomes for a submitted batch, in completion order.
///
/// Yields exactly one outcome per submitted unit and then ends.
pub struct PartialResults<T> {
    tasks: JoinSet<Result<T, DetailError>>,
    pending: HashMap<task::Id, String>,
}

impl<T: Send + 'static> PartialResults<T> {
    /// Spawns every unit and returns the stream of their outcomes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<I>(units: I) -> Self
    where
        I: IntoIterator<Item = RequestUnit<T>>,
    {
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        for unit in units {
            let handle = tasks.spawn(unit.future);
            pending.insert(handle.id(), unit.source);
        }
        Self { tasks, pending }
    }

    /// Number of units that have not produced an outcome yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// Waits for whichever pending unit finishes first.
    pub async fn next_outcome(&mut self) -> Option<PartialOutcome<T>> {
        std::future::poll_fn(|cx| self.poll_outcome(cx)).await
    }

    fn poll_outcome(&mut self, cx: &mut Context<'_>) -> Poll<Option<PartialOutcome<T>>> {
        let outcome = match ready!(self.tasks.poll_join_next_with_id(cx)) {
            None => return Poll::Ready(None),
            Some(Ok((id, result))) => PartialOutcome {
                source: self.take_source(id),
                result,
            },
            Some(Err(err)) => PartialOutcome {
                source: self.take_source(err.id()),
                result: Err(join_failure(err)),
            },
        };
        if let Err(e) = &outcome.result {
            tracing::debug!(source = %outcome.source, error = %e, "unit failed");
        }
        Poll::Ready(Some(outcome))
    }

    fn take_source(&mut self, id: task::Id) -> String {
        self.pending.remove(&id).unwrap_or_default()
    }
}

fn join_failure(err: JoinError) -> DetailError {
    if err.is_cancelled() {
        return DetailError::Cancelled;
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    DetailError::Panicked(message)
}

impl<T: Send + 'static> Stream for PartialResults<T> {
    type Item = PartialOutcome<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_outcome(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}
