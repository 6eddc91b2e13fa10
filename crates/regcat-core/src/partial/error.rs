//! Failure of a single detail fetch, carried inside a `PartialOutcome`.

use thiserror::Error;

use crate::error::TransportError;
use crate::pager::PageFetchError;

#[derive(Debug, Error)]
pub enum DetailError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The detail fetch itself walked a paginated list and that failed.
    #[error(transparent)]
    Pages(#[from] PageFetchError),
    /// The unit's task was aborted before it completed.
    #[error("request cancelled before completion")]
    Cancelled,
    /// The unit's task panicked.
    #[error("request panicked: {0}")]
    Panicked(String),
}
