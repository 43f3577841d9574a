//! I/O operations for fetching.
//!
//! The HTTP client seam, the redirect-following fetcher, the shared content
//! cache and the dispatcher-driven fetch queue.

mod cache;
mod fetcher;
mod http;
mod queue;

pub use cache::ContentCache;
pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient, HttpResponse};
pub use queue::FetchQueue;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
