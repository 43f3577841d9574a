use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::task::JoinError;
use url::Url;

use crate::data::{FetchJob, Fetched};
use crate::effects::cache::ContentCache;
use crate::effects::fetcher::Fetcher;
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result};
use crate::events::EventSink;

type Reply = oneshot::Sender<Result<Fetched>>;
type Settled = (FetchJob, std::result::Result<Result<Fetched>, JoinError>);

struct Request {
    url: Url,
    reply: Reply,
}

/// Bounded-concurrency fetch queue in front of a [`ContentCache`].
///
/// Handles are cheap to clone. All of them talk to one dispatcher task that
/// owns the job queue, the waiter lists and the worker slots. The dispatcher
/// exits once every handle is dropped and outstanding jobs have settled.
#[derive(Clone)]
pub struct FetchQueue {
    cache: Arc<ContentCache>,
    requests: mpsc::UnboundedSender<Request>,
}

impl FetchQueue {
    /// Spawn the dispatcher on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new<C>(fetcher: Fetcher<C>, cache: Arc<ContentCache>) -> Self
    where
        C: HttpClient + 'static,
    {
        let (requests, inbox) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(fetcher, Arc::clone(&cache));
        tokio::spawn(dispatcher.run(inbox));
        Self { cache, requests }
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// Return the body for `url`, fetching it at most once per build.
    ///
    /// Concurrent calls for a URL that is already queued or in flight wait on
    /// that job instead of issuing their own request.
    ///
    /// # Errors
    ///
    /// The job's terminal error: [`FetchError::Exhausted`] once the retry
    /// budget is spent, or a non-retryable error such as
    /// [`FetchError::TooManyRedirects`].
    pub async fn fetch_and_cache(&self, url: &Url) -> Result<Fetched> {
        if let Some(hit) = self.cache.lookup(url) {
            return Ok(hit);
        }

        let (reply, outcome) = oneshot::channel();
        self.requests
            .send(Request {
                url: url.clone(),
                reply,
            })
            .map_err(|_| FetchError::QueueClosed)?;

        outcome.await.map_err(|_| FetchError::QueueClosed)?
    }
}

struct Dispatcher<C: HttpClient> {
    fetcher: Arc<Fetcher<C>>,
    cache: Arc<ContentCache>,
    sink: Arc<dyn EventSink>,
    slots: Arc<Semaphore>,
    max_attempts: u32,
    queue: VecDeque<FetchJob>,
    waiters: HashMap<Url, Vec<Reply>>,
    in_flight: FuturesUnordered<BoxFuture<'static, Settled>>,
}

impl<C: HttpClient + 'static> Dispatcher<C> {
    fn new(fetcher: Fetcher<C>, cache: Arc<ContentCache>) -> Self {
        let options = fetcher.options();
        let slots = Arc::new(Semaphore::new(options.max_concurrent.max(1)));
        let max_attempts = options.retries.max(1);
        let sink = Arc::clone(fetcher.sink());

        Self {
            fetcher: Arc::new(fetcher),
            cache,
            sink,
            slots,
            max_attempts,
            queue: VecDeque::new(),
            waiters: HashMap::new(),
            in_flight: FuturesUnordered::new(),
        }
    }

    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Request>) {
        let mut open = true;

        loop {
            self.dispatch();

            if !open && self.queue.is_empty() && self.in_flight.is_empty() {
                break;
            }

            tokio::select! {
                request = inbox.recv(), if open => match request {
                    Some(request) => self.accept(request),
                    None => open = false,
                },
                Some(settled) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.settle(settled);
                }
                else => break,
            }
        }

        tracing::debug!("fetch queue stopped");
    }

    fn accept(&mut self, Request { url, reply }: Request) {
        if let Some(hit) = self.cache.lookup(&url) {
            let _ = reply.send(Ok(hit));
            return;
        }

        match self.waiters.get_mut(&url) {
            Some(waiting) => waiting.push(reply),
            None => {
                self.waiters.insert(url.clone(), vec![reply]);
                self.queue.push_back(FetchJob::new(url));
            }
        }
    }

    /// Start queued jobs while worker slots are free.
    fn dispatch(&mut self) {
        while !self.queue.is_empty() {
            let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
                break;
            };
            let Some(mut job) = self.queue.pop_front() else {
                break;
            };

            job.start();
            if job.attempts == 1 {
                self.sink.module_started(job.url.as_str());
            }
            tracing::debug!(url = %job.url, attempt = job.attempts, "dispatch");

            let fetcher = Arc::clone(&self.fetcher);
            let url = job.url.clone();
            let handle = tokio::spawn(async move {
                let outcome = fetcher.fetch_once(&url).await;
                drop(permit);
                outcome
            });
            self.in_flight.push(handle.map(move |joined| (job, joined)).boxed());
        }
    }

    fn settle(&mut self, (mut job, joined): Settled) {
        let outcome = joined.unwrap_or_else(|e| {
            Err(FetchError::Transport {
                url: job.url.to_string(),
                message: format!("fetch task failed: {e}"),
            })
        });

        match outcome {
            Ok(fetched) => {
                job.succeed(fetched.redirects);
                self.cache.put(fetched.url.clone(), fetched.body.clone());
                self.cache.alias(job.url.clone(), fetched.url.clone());
                self.sink.module_completed(job.url.as_str());
                self.resolve(&job.url, Ok(fetched));
            }
            Err(err) if err.is_retryable() && job.can_retry(self.max_attempts) => {
                job.requeue();
                let text = format!(
                    "{err}; retrying ({}/{})",
                    job.attempts, self.max_attempts
                );
                tracing::warn!(url = %job.url, "{text}");
                self.sink.warning(&text);
                job.enqueue();
                self.queue.push_back(job);
            }
            Err(err) if err.is_retryable() => {
                job.exhaust();
                tracing::error!(url = %job.url, attempts = job.attempts, "{err}");
                let exhausted = FetchError::Exhausted {
                    url: job.url.to_string(),
                    attempts: job.attempts,
                    last: Box::new(err),
                };
                self.resolve(&job.url, Err(exhausted));
            }
            Err(err) => {
                job.exhaust();
                tracing::error!(url = %job.url, "{err}");
                self.resolve(&job.url, Err(err));
            }
        }
    }

    fn resolve(&mut self, url: &Url, outcome: Result<Fetched>) {
        for reply in self.waiters.remove(url).unwrap_or_default() {
            let _ = reply.send(outcome.clone());
        }
    }
}
