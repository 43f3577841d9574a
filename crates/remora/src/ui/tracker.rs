use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use remora_fetch::EventSink;

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {pos:>4} loaded {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const TICK_INTERVAL: Duration = Duration::from_millis(100);

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Spinner on stderr counting loaded modules.
///
/// Warnings and errors are printed above the spinner so they survive it.
pub struct ProgressSink {
    pb: ProgressBar,
}

impl ProgressSink {
    pub fn new(prefix: &str) -> Self {
        let sink = Self::with_bar(ProgressBar::new_spinner(), prefix);
        sink.pb.enable_steady_tick(TICK_INTERVAL);
        sink
    }

    /// A sink that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), "")
    }

    fn with_bar(pb: ProgressBar, prefix: &str) -> Self {
        let pb = match PB_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        pb.set_prefix(prefix.to_string());
        Self { pb }
    }

    pub fn loaded(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(&self, msg: impl Into<String>) {
        self.pb.finish_with_message(msg.into());
    }
}

impl EventSink for ProgressSink {
    fn module_started(&self, name: &str) {
        self.pb.set_message(format!("📦 {name}"));
    }

    fn module_completed(&self, _name: &str) {
        self.pb.inc(1);
    }

    fn warning(&self, text: &str) {
        self.pb.println(format!("warning: {text}"));
    }

    fn error(&self, text: &str) {
        self.pb.println(format!("error: {text}"));
    }
}
