//! Page-level failure: fatal to a whole pagination run.

use thiserror::Error;

use super::Cursor;
use crate::error::TransportError;

#[derive(Debug, Error)]
pub enum PageFetchError {
    /// A page request failed.
    #[error("unable to retrieve {stage} (page {page}, cursor {cursor:?}): {source}")]
    Transport {
        stage: String,
        page: usize,
        cursor: Option<Cursor>,
        #[source]
        source: TransportError,
    },
    /// The server returned a cursor that was already followed.
    #[error("unable to retrieve {stage}: page {page} repeated cursor {cursor:?}")]
    StalledCursor {
        stage: String,
        page: usize,
        cursor: Cursor,
    },
}

impl PageFetchError {
    /// Label of the list whose pagination failed.
    pub fn stage(&self) -> &str {
        match self {
            PageFetchError::Transport { stage, .. } | PageFetchError::StalledCursor { stage, .. } => {
                stage
            }
        }
    }
}
