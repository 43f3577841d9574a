//! Import specifier resolution.
//!
//! # Architecture
//!
//! Resolution is a mechanism that classifies a specifier and its importer
//! into one of three namespaces:
//!
//! - [`Namespace::Remote`]: an `http(s)` URL, normalized against the importer
//! - [`Namespace::External`]: a platform built-in, passed through untouched
//! - [`Namespace::Local`]: a file found on disk
//!
//! How local files are found is policy, expressed through the
//! [`LocalLookup`] trait. [`PairLookup`] chains a primary strategy with a
//! fallback, and the default pairs [`RelativeLookup`] with [`ModulesLookup`].
//!
//! # Example
//!
//! ```
//! use remora_resolve::{Location, Resolver};
//! use url::Url;
//!
//! let resolver = Resolver::new(std::env::temp_dir());
//! let importer = Location::Remote(Url::parse("https://x.test/a/index.js").unwrap());
//!
//! let resolved = resolver.resolve("./b.js", Some(&importer)).unwrap();
//! assert_eq!(resolved.to_string(), "https://x.test/a/b.js");
//!
//! let fs = resolver.resolve("node:fs", None).unwrap();
//! assert!(matches!(fs, Location::External(_)));
//! ```

pub use builtin::is_builtin;
pub use error::{ResolveError, Result};
pub use location::{Location, Namespace};
pub use lookup::{DEFAULT_EXTENSIONS, DefaultLookup, LocalLookup, ModulesLookup, PairLookup, RelativeLookup};
pub use resolver::Resolver;

mod builtin;
mod error;
mod location;
mod lookup;
mod resolver;
