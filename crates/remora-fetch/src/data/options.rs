use std::time::Duration;

/// Configuration for the fetcher and the fetch queue.
///
/// # Examples
///
/// ```
/// use remora_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .max_concurrent(8)
///     .timeout(Duration::from_secs(10))
///     .retries(5);
/// assert_eq!(options.max_concurrent, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Worker slots: the most fetches that may be in flight at once.
    ///
    /// Default: half the logical CPUs, at least 1
    pub max_concurrent: usize,

    /// Deadline for one logical fetch, covering redirects and the body.
    ///
    /// Default: 5000ms
    pub timeout: Duration,

    /// Total attempts per job before it is exhausted.
    ///
    /// Only transport errors, timeouts and unexpected status codes are
    /// retried. Each retry goes to the back of the queue.
    ///
    /// Default: 3
    pub retries: u32,

    /// Redirects followed before failing with `TooManyRedirects`.
    ///
    /// Default: 20
    pub max_redirects: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: default_concurrency(),
            timeout: Duration::from_millis(5000),
            retries: 3,
            max_redirects: 20,
        }
    }
}

fn default_concurrency() -> usize {
    (num_cpus::get() / 2).max(1)
}

impl FetchOptions {
    /// Set the number of worker slots. Values below 1 are raised to 1.
    #[must_use]
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the attempt cap per job. Values below 1 are raised to 1.
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    #[must_use]
    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}
