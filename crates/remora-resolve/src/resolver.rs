use std::collections::HashSet;
use std::path::{Path, PathBuf};

use url::Url;

use crate::builtin::is_builtin;
use crate::error::{ResolveError, Result};
use crate::location::Location;
use crate::lookup::{DefaultLookup, LocalLookup};

/// Classifies `(specifier, importer)` pairs into canonical [`Location`]s.
///
/// Resolution only reads the filesystem; it keeps no state between calls.
#[derive(Debug, Clone)]
pub struct Resolver<L = DefaultLookup> {
    cwd: PathBuf,
    lookup: L,
    externals: HashSet<String>,
}

impl Resolver<DefaultLookup> {
    /// Resolver using relative lookup with a `node_modules` fallback.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::with_lookup(cwd, DefaultLookup::default())
    }
}

impl<L: LocalLookup> Resolver<L> {
    pub fn with_lookup(cwd: impl Into<PathBuf>, lookup: L) -> Self {
        Self {
            cwd: cwd.into(),
            lookup,
            externals: HashSet::new(),
        }
    }

    /// Treat these names (and their sub-paths) as external besides the built-ins.
    #[must_use]
    pub fn externals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.externals.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve `specifier` as imported by `importer`; `None` for entry points.
    ///
    /// First match wins:
    /// 1. absolute `http(s)` URLs are remote
    /// 2. relative specifiers of a remote importer join its URL
    /// 3. built-ins and configured externals are external
    /// 4. anything else must exist on disk
    ///
    /// # Errors
    ///
    /// [`ResolveError::NotFound`] when no namespace accepts the specifier,
    /// [`ResolveError::InvalidUrl`] when a URL cannot be parsed or joined.
    pub fn resolve(&self, specifier: &str, importer: Option<&Location>) -> Result<Location> {
        let remote_importer = importer.and_then(Location::as_url);

        if is_absolute_url(specifier) {
            let url = match remote_importer {
                Some(base) => base.join(specifier),
                None => Url::parse(specifier),
            };
            return url
                .map(Location::Remote)
                .map_err(|source| invalid_url(specifier, importer, source));
        }

        if let Some(base) = remote_importer {
            if is_relative(specifier) {
                return base
                    .join(specifier)
                    .map(Location::Remote)
                    .map_err(|source| invalid_url(specifier, importer, source));
            }
        }

        if self.is_external(specifier) {
            return Ok(Location::External(specifier.to_string()));
        }

        let base = importer
            .and_then(Location::as_path)
            .and_then(Path::parent)
            .unwrap_or(self.cwd.as_path());

        self.lookup
            .lookup(specifier, base)
            .map(Location::File)
            .ok_or_else(|| ResolveError::NotFound {
                specifier: specifier.to_string(),
                importer: importer.map(ToString::to_string),
            })
    }

    fn is_external(&self, specifier: &str) -> bool {
        is_builtin(specifier)
            || self.externals.iter().any(|name| {
                specifier == name
                    || specifier
                        .strip_prefix(name.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

fn is_absolute_url(specifier: &str) -> bool {
    let lower = specifier.get(..8).unwrap_or(specifier).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

fn invalid_url(specifier: &str, importer: Option<&Location>, source: url::ParseError) -> ResolveError {
    ResolveError::InvalidUrl {
        specifier: specifier.to_string(),
        importer: importer.map(ToString::to_string),
        source,
    }
}
