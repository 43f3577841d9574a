//! Remote module fetching with redirects, retries and a build-lifetime cache.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and result types
//! - [`core`] - Pure helpers (redirect classification, location resolution)
//! - [`effects`] - I/O: the HTTP client seam, the fetcher, the cache and the queue
//!
//! # Key Features
//!
//! - **Single Winner**: concurrent requests for one URL share a single network fetch
//! - **Bounded**: at most `max_concurrent` fetches are in flight at any time
//! - **Job-Level Retries**: failed fetches are requeued FIFO up to a hard attempt cap
//! - **Canonical Keys**: bodies are cached under the post-redirect URL

pub mod core;
pub mod data;
mod effects;
mod error;
mod events;

pub use crate::core::{is_insecure, is_redirect, resolve_location};
pub use data::{FetchJob, FetchOptions, Fetched, JobState};
pub use effects::{BoxStream, ContentCache, FetchQueue, Fetcher, HttpClient, HttpResponse};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{FetchError, Result};
pub use events::{EventSink, NoopSink};
