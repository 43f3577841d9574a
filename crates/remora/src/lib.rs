//! Bundler-facing glue over `remora-resolve` and `remora-fetch`.
//!
//! [`Loader`] is the adapter a bundler calls for every import
//! (`on_resolve`) and every module body (`on_load`). [`build`] drives it over
//! a whole import graph; parsing and emission stay with the bundler.

pub mod adapter;
pub mod build;
pub mod cli;
pub mod config;
mod error;
pub mod scan;
pub mod ui;

pub use adapter::{Loaded, Loader};
pub use build::{BuildReport, Module, build};
pub use config::BuildConfig;
pub use error::BuildError;
