//! Immutable data types for fetching.
//!
//! Configuration, the per-URL job record tracked by the queue, and the
//! result handed back to callers.

mod job;
mod options;

pub use job::{FetchJob, JobState};
pub use options::FetchOptions;

use bytes::Bytes;
use url::Url;

/// A successfully fetched body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// Final URL after redirects. This is the cache key and the base for
    /// resolving the module's own imports.
    pub url: Url,
    pub body: Bytes,
    /// Redirects followed to reach `url`.
    pub redirects: u32,
}
