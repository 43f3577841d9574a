mod tracker;

pub use tracker::ProgressSink;
