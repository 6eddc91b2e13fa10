//! Transport error type shared by page fetches and detail fetches.

use thiserror::Error;

/// Failure of a single registry request.
///
/// Produced by the curl transport and by any other `PageSource` or detail
/// fetch implementation. Nothing here is retried; callers decide how far a
/// failure propagates.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The registry base URL or a derived request URL could not be built.
    #[error("invalid registry URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Curl reported an error (timeout, connection refused, DNS, ...).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// The registry answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}")]
    Http {
        method: &'static str,
        url: String,
        status: u32,
    },
    /// The response body was not the JSON document we expected.
    #[error("decoding response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// The response parsed but is missing something we need.
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
    /// The blocking task running the request was cancelled or panicked.
    #[error("transport task failed: {0}")]
    Task(String),
}

impl TransportError {
    /// HTTP status for `Http` errors, `None` otherwise.
    pub fn status(&self) -> Option<u32> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
