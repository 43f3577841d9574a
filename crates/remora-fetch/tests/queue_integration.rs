use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::join_all;
use futures_util::stream;
use parking_lot::Mutex;
use remora_fetch::{
    ContentCache, EventSink, FetchError, FetchOptions, FetchQueue, Fetcher, HttpClient, HttpResponse,
};
use url::Url;

#[derive(Debug, thiserror::Error)]
#[error("connection reset by peer")]
struct ResetError;

#[derive(Clone)]
enum Route {
    Body(&'static str),
    Redirect(u16, String),
    /// Transport error for the first `n` calls, then the body.
    Flaky(u32, &'static str),
    AlwaysReset,
    Status(u16),
    Hang,
}

struct MockClient {
    routes: HashMap<String, Route>,
    latency: Duration,
    calls: Mutex<HashMap<String, u32>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MockClient {
    fn new() -> Self {
        Self {
            routes: HashMap::new(),
            latency: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }

    fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Shared view of a client moved into a fetcher.
#[derive(Clone)]
struct Shared(Arc<MockClient>);

impl Shared {
    fn calls(&self, url: &str) -> u32 {
        self.0.calls.lock().get(url).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> u32 {
        self.0.calls.lock().values().sum()
    }

    fn peak(&self) -> usize {
        self.0.peak.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl HttpClient for Shared {
    type Error = ResetError;

    async fn get(&self, url: &Url) -> Result<HttpResponse<ResetError>, ResetError> {
        let client = &self.0;
        let call = {
            let mut calls = client.calls.lock();
            let count = calls.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let now = client.active.fetch_add(1, Ordering::SeqCst) + 1;
        client.peak.fetch_max(now, Ordering::SeqCst);
        let _active = ActiveGuard(&client.active);

        if !client.latency.is_zero() {
            tokio::time::sleep(client.latency).await;
        }

        let route = client.routes.get(url.as_str()).cloned().ok_or(ResetError)?;
        let (status, location, body) = match route {
            Route::Body(body) => (200, None, body),
            Route::Redirect(code, to) => (code, Some(to), ""),
            Route::Flaky(failures, body) if call > failures => (200, None, body),
            Route::Flaky(..) | Route::AlwaysReset => return Err(ResetError),
            Route::Status(code) => (code, None, ""),
            Route::Hang => std::future::pending::<(u16, Option<String>, &'static str)>().await,
        };

        let (head, tail) = body.split_at(body.len() / 2);
        let chunks = vec![
            Ok(Bytes::from_static(head.as_bytes())),
            Ok(Bytes::from_static(tail.as_bytes())),
        ];
        Ok(HttpResponse {
            status,
            location,
            body: Box::pin(stream::iter(chunks)),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    started: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl EventSink for RecordingSink {
    fn module_started(&self, name: &str) {
        self.started.lock().push(name.to_string());
    }

    fn module_completed(&self, name: &str) {
        self.completed.lock().push(name.to_string());
    }

    fn warning(&self, text: &str) {
        self.warnings.lock().push(text.to_string());
    }
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn queue(client: MockClient, options: FetchOptions) -> (FetchQueue, Shared) {
    let shared = Shared(Arc::new(client));
    let fetcher = Fetcher::new(shared.clone(), options);
    (FetchQueue::new(fetcher, Arc::new(ContentCache::new())), shared)
}

#[tokio::test]
async fn test_second_fetch_served_from_cache() {
    let (queue, client) = queue(
        MockClient::new().route("https://x.test/a.js", Route::Body("export const a = 1;")),
        FetchOptions::default(),
    );
    let target = url("https://x.test/a.js");

    let first = queue.fetch_and_cache(&target).await.unwrap();
    let second = queue.fetch_and_cache(&target).await.unwrap();

    assert_eq!(first.body, Bytes::from_static(b"export const a = 1;"));
    assert_eq!(second.body, first.body);
    assert_eq!(client.calls("https://x.test/a.js"), 1);
    assert!(queue.cache().contains(&target));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_share_one_fetch() {
    let (queue, client) = queue(
        MockClient::new()
            .route("https://x.test/shared.js", Route::Body("shared"))
            .latency(Duration::from_millis(50)),
        FetchOptions::default().max_concurrent(4),
    );
    let target = url("https://x.test/shared.js");

    let results = join_all((0..16).map(|_| queue.fetch_and_cache(&target))).await;

    assert_eq!(client.calls("https://x.test/shared.js"), 1);
    for result in results {
        assert_eq!(result.unwrap().body, Bytes::from_static(b"shared"));
    }
}

#[tokio::test]
async fn test_redirect_chain_caches_final_url() {
    let (queue, client) = queue(
        MockClient::new()
            .route("https://x.test/lib", Route::Redirect(301, "/lib@2".into()))
            .route("https://x.test/lib@2", Route::Redirect(302, "https://cdn.test/lib@2.1.0/mod.js".into()))
            .route("https://cdn.test/lib@2.1.0/mod.js", Route::Body("final body")),
        FetchOptions::default(),
    );
    let requested = url("https://x.test/lib");
    let resolved = url("https://cdn.test/lib@2.1.0/mod.js");

    let fetched = queue.fetch_and_cache(&requested).await.unwrap();

    assert_eq!(fetched.url, resolved);
    assert_eq!(fetched.body, Bytes::from_static(b"final body"));
    assert_eq!(fetched.redirects, 2);
    assert_eq!(queue.cache().canonical(&requested), Some(resolved.clone()));
    assert_eq!(queue.cache().len(), 1);

    // Both the requested and the final URL are now cache hits.
    queue.fetch_and_cache(&requested).await.unwrap();
    queue.fetch_and_cache(&resolved).await.unwrap();
    assert_eq!(client.total_calls(), 3);
}

#[tokio::test]
async fn test_always_failing_url_is_exhausted_after_retries() {
    let (queue, client) = queue(
        MockClient::new().route("https://x.test/down.js", Route::AlwaysReset),
        FetchOptions::default().retries(3),
    );

    let err = queue.fetch_and_cache(&url("https://x.test/down.js")).await.unwrap_err();

    match err {
        FetchError::Exhausted { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, FetchError::Transport { .. }));
        }
        other => panic!("expected exhausted, got {other:?}"),
    }
    assert_eq!(client.calls("https://x.test/down.js"), 3);
    assert!(queue.cache().is_empty());
}

#[tokio::test]
async fn test_success_on_last_allowed_attempt() {
    let (queue, client) = queue(
        MockClient::new().route("https://x.test/flaky.js", Route::Flaky(2, "finally")),
        FetchOptions::default().retries(3),
    );

    let fetched = queue.fetch_and_cache(&url("https://x.test/flaky.js")).await.unwrap();

    assert_eq!(fetched.body, Bytes::from_static(b"finally"));
    assert_eq!(client.calls("https://x.test/flaky.js"), 3);
}

#[tokio::test]
async fn test_status_errors_are_retried_then_exhausted() {
    let (queue, client) = queue(
        MockClient::new().route("https://x.test/missing.js", Route::Status(404)),
        FetchOptions::default().retries(2),
    );

    let err = queue.fetch_and_cache(&url("https://x.test/missing.js")).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::Exhausted { attempts: 2, ref last, .. } if matches!(**last, FetchError::HttpStatus { code: 404, .. })
    ));
    assert_eq!(client.calls("https://x.test/missing.js"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_never_exceeds_worker_slots() {
    let mut client = MockClient::new().latency(Duration::from_millis(100));
    let urls: Vec<Url> = (0..12)
        .map(|i| url(&format!("https://x.test/m{i}.js")))
        .collect();
    for target in &urls {
        client = client.route(target.as_str(), Route::Body("m"));
    }
    let (queue, client) = queue(client, FetchOptions::default().max_concurrent(3));

    let results = join_all(urls.iter().map(|target| queue.fetch_and_cache(target))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(client.total_calls(), 12);
    assert_eq!(client.peak(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_request_times_out_at_deadline() {
    let (queue, client) = queue(
        MockClient::new().route("https://x.test/hang.js", Route::Hang),
        FetchOptions::default()
            .timeout(Duration::from_millis(5000))
            .retries(1),
    );

    let started = tokio::time::Instant::now();
    let err = queue.fetch_and_cache(&url("https://x.test/hang.js")).await.unwrap_err();
    let elapsed = started.elapsed();

    match err {
        FetchError::Exhausted { attempts: 1, last, .. } => {
            assert!(matches!(*last, FetchError::Timeout { .. }));
        }
        other => panic!("expected timeout exhaustion, got {other:?}"),
    }
    assert!(elapsed >= Duration::from_millis(5000));
    assert!(elapsed < Duration::from_millis(5100));
    assert_eq!(client.calls("https://x.test/hang.js"), 1);
}

#[tokio::test]
async fn test_twenty_one_redirects_is_rejected() {
    let mut client = MockClient::new();
    for i in 0..=20 {
        client = client.route(
            &format!("https://x.test/r{i}"),
            Route::Redirect(307, format!("/r{}", i + 1)),
        );
    }
    client = client.route("https://x.test/r21", Route::Body("unreachable"));
    let (queue, client) = queue(client, FetchOptions::default());

    let err = queue.fetch_and_cache(&url("https://x.test/r0")).await.unwrap_err();

    assert!(matches!(err, FetchError::TooManyRedirects { limit: 20, .. }));
    // Not retryable: a single attempt walks the chain once.
    assert_eq!(client.calls("https://x.test/r0"), 1);
    assert_eq!(client.calls("https://x.test/r21"), 0);
}

#[tokio::test]
async fn test_redirect_off_the_web_fails_once() {
    let (queue, client) = queue(
        MockClient::new().route(
            "https://x.test/a.js",
            Route::Redirect(302, "file:///etc/passwd".to_string()),
        ),
        FetchOptions::default(),
    );
    let target = url("https://x.test/a.js");

    let err = queue.fetch_and_cache(&target).await.unwrap_err();

    assert!(matches!(err, FetchError::InvalidRedirect { .. }));
    assert_eq!(client.calls("https://x.test/a.js"), 1);
    assert_eq!(client.total_calls(), 1);
    assert!(!queue.cache().contains(&target));
}

#[tokio::test]
async fn test_twenty_redirects_is_accepted() {
    let mut client = MockClient::new();
    for i in 1..=20 {
        client = client.route(
            &format!("https://x.test/r{i}"),
            Route::Redirect(302, format!("/r{}", i + 1)),
        );
    }
    client = client.route("https://x.test/r21", Route::Body("landed"));
    let (queue, _client) = queue(client, FetchOptions::default());

    let fetched = queue.fetch_and_cache(&url("https://x.test/r1")).await.unwrap();
    assert_eq!(fetched.body, Bytes::from_static(b"landed"));
    assert_eq!(fetched.redirects, 20);
}

#[tokio::test(start_paused = true)]
async fn test_requeued_job_goes_behind_waiting_jobs() {
    let client = MockClient::new()
        .route("https://x.test/flaky.js", Route::Flaky(1, "flaky"))
        .route("https://x.test/b.js", Route::Body("b"))
        .route("https://x.test/c.js", Route::Body("c"))
        .latency(Duration::from_millis(10));
    let sink = Arc::new(RecordingSink::default());
    let shared = Shared(Arc::new(client));
    let fetcher = Fetcher::new(shared.clone(), FetchOptions::default().max_concurrent(1))
        .with_sink(sink.clone());
    let queue = FetchQueue::new(fetcher, Arc::new(ContentCache::new()));

    let targets = [
        url("https://x.test/flaky.js"),
        url("https://x.test/b.js"),
        url("https://x.test/c.js"),
    ];
    let results = join_all(targets.iter().map(|target| queue.fetch_and_cache(target))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(
        *sink.completed.lock(),
        vec![
            "https://x.test/b.js".to_string(),
            "https://x.test/c.js".to_string(),
            "https://x.test/flaky.js".to_string(),
        ]
    );
    assert_eq!(sink.started.lock().len(), 3);
    assert_eq!(sink.warnings.lock().len(), 1);
}
