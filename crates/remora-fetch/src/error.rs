//! Error types for remora-fetch.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Failure of a fetch.
///
/// Errors are `Clone` because one outcome is delivered to every caller
/// waiting on the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("GET {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("GET {url} timed out after {}ms", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    #[error("GET {url} failed: status {code}")]
    HttpStatus { url: String, code: u16 },

    #[error("GET {url} exceeded {limit} redirects")]
    TooManyRedirects { url: String, limit: u32 },

    #[error("GET {url} returned an unusable redirect location {location:?}")]
    InvalidRedirect { url: String, location: Option<String> },

    #[error("GET {url} failed after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("fetch queue is no longer running")]
    QueueClosed,
}

impl FetchError {
    /// Whether the queue may requeue a job that failed with this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Transport { .. } | FetchError::Timeout { .. } | FetchError::HttpStatus { .. }
        )
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::TooManyRedirects { url, .. }
            | FetchError::InvalidRedirect { url, .. }
            | FetchError::Exhausted { url, .. } => Some(url),
            FetchError::QueueClosed => None,
        }
    }
}
