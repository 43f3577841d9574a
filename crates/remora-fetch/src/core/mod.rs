//! Pure helpers for HTTP fetching.
//!
//! Nothing in here performs I/O; the effects layer calls these to decide
//! how to react to a response.

mod validation;

pub use validation::{is_insecure, is_redirect, resolve_location};
