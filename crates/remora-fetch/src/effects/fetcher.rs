use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use url::Url;

use crate::core::{is_insecure, is_redirect, resolve_location};
use crate::data::{FetchOptions, Fetched};
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result};
use crate::events::{EventSink, NoopSink};

/// Performs single logical fetches: one GET plus any redirects, under a deadline.
///
/// A fetcher never touches the cache, so failed attempts leave no trace.
pub struct Fetcher<C: HttpClient> {
    client: C,
    options: FetchOptions,
    sink: Arc<dyn EventSink>,
    warned_insecure: AtomicBool,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, options: FetchOptions) -> Self {
        Self {
            client,
            options,
            sink: Arc::new(NoopSink),
            warned_insecure: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Fetch `url`, following redirects, within the configured timeout.
    ///
    /// On timeout the request future is dropped, which aborts the
    /// underlying connection.
    pub async fn fetch_once(&self, url: &Url) -> Result<Fetched> {
        let timeout = self.options.timeout;
        match tokio::time::timeout(timeout, self.follow(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }),
        }
    }

    async fn follow(&self, start: &Url) -> Result<Fetched> {
        let mut url = start.clone();
        let mut redirects = 0u32;

        loop {
            self.warn_if_insecure(&url);
            tracing::debug!(%url, redirects, "GET");

            let response = self.client.get(&url).await.map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            match response.status {
                200 => {
                    let mut body = BytesMut::new();
                    let mut stream = response.body;
                    while let Some(chunk) = stream.next().await {
                        let chunk = chunk.map_err(|e| FetchError::Transport {
                            url: url.to_string(),
                            message: e.to_string(),
                        })?;
                        body.extend_from_slice(&chunk);
                    }
                    return Ok(Fetched {
                        url,
                        body: Bytes::from(body),
                        redirects,
                    });
                }
                status if is_redirect(status) => {
                    let next = response
                        .location
                        .as_deref()
                        .and_then(|location| resolve_location(&url, location))
                        .ok_or_else(|| FetchError::InvalidRedirect {
                            url: url.to_string(),
                            location: response.location.clone(),
                        })?;

                    redirects += 1;
                    if redirects > self.options.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            url: start.to_string(),
                            limit: self.options.max_redirects,
                        });
                    }
                    tracing::debug!(from = %url, to = %next, status, "redirect");
                    url = next;
                }
                code => {
                    return Err(FetchError::HttpStatus {
                        url: url.to_string(),
                        code,
                    });
                }
            }
        }
    }

    fn warn_if_insecure(&self, url: &Url) {
        if is_insecure(url) && !self.warned_insecure.swap(true, Ordering::Relaxed) {
            let text = format!("fetching {url} over plain http; content is not protected in transit");
            tracing::warn!("{text}");
            self.sink.warning(&text);
        }
    }
}
