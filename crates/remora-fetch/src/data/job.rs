use std::fmt;

use url::Url;

/// Lifecycle of a fetch job.
///
/// `Queued → InFlight → {Succeeded | Requeued → Queued | Exhausted}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Queued,
    InFlight,
    Succeeded,
    Requeued,
    Exhausted,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Queued => write!(f, "Queued"),
            JobState::InFlight => write!(f, "InFlight"),
            JobState::Succeeded => write!(f, "Succeeded"),
            JobState::Requeued => write!(f, "Requeued"),
            JobState::Exhausted => write!(f, "Exhausted"),
        }
    }
}

/// The retrieval attempt sequence for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub url: Url,
    /// Attempts started so far.
    pub attempts: u32,
    /// Redirects followed by the latest attempt.
    pub redirects: u32,
    pub state: JobState,
}

impl FetchJob {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            attempts: 0,
            redirects: 0,
            state: JobState::Queued,
        }
    }

    /// Move to `InFlight`, counting the attempt.
    pub fn start(&mut self) {
        self.attempts += 1;
        self.state = JobState::InFlight;
    }

    /// Whether another attempt fits under `max_attempts`.
    pub fn can_retry(&self, max_attempts: u32) -> bool {
        self.attempts < max_attempts
    }

    pub fn requeue(&mut self) {
        self.state = JobState::Requeued;
    }

    /// A requeued job waiting for a slot again.
    pub fn enqueue(&mut self) {
        self.state = JobState::Queued;
    }

    pub fn succeed(&mut self, redirects: u32) {
        self.redirects = redirects;
        self.state = JobState::Succeeded;
    }

    pub fn exhaust(&mut self) {
        self.state = JobState::Exhausted;
    }
}
