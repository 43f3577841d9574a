use std::fmt;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use url::Url;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// The parts of a response the fetcher looks at.
pub struct HttpResponse<E> {
    pub status: u16,
    /// Raw `Location` header, if any.
    pub location: Option<String>,
    pub body: BoxStream<'static, Result<Bytes, E>>,
}

impl<E> fmt::Debug for HttpResponse<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("location", &self.location)
            .field("body", &"{ ... }")
            .finish()
    }
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations issue exactly one GET per call and must NOT follow
/// redirects themselves; the fetcher counts and follows them.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Transport-level error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a GET request and return the status, redirect target and body stream.
    ///
    /// # Errors
    ///
    /// Returns an error for connection-level failures only. Non-2xx statuses
    /// are reported through [`HttpResponse::status`].
    fn get(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<HttpResponse<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use futures_util::StreamExt;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a client with automatic redirects disabled.
        pub fn new() -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .user_agent(concat!("remora/", env!("CARGO_PKG_VERSION")))
                .build()?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn get(&self, url: &Url) -> Result<HttpResponse<Self::Error>, Self::Error> {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status().as_u16();
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = response.bytes_stream().map(|chunk| chunk.map(Bytes::from));

            Ok(HttpResponse {
                status,
                location,
                body: Box::pin(body),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
