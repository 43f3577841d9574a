/// Receiver of progress and diagnostic events.
///
/// Calls must not block; every method defaults to a no-op so sinks only
/// implement what they render.
pub trait EventSink: Send + Sync {
    fn module_started(&self, _name: &str) {}

    fn module_completed(&self, _name: &str) {}

    fn warning(&self, _text: &str) {}

    /// A terminal failure for one module.
    fn error(&self, _text: &str) {}
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}
