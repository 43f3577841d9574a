use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

/// Which loader services a resolved module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Remote,
    Local,
    External,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Remote => write!(f, "remote"),
            Namespace::Local => write!(f, "local"),
            Namespace::External => write!(f, "external"),
        }
    }
}

/// Canonical identity of a module; the key for dedup and caching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Remote(Url),
    File(PathBuf),
    External(String),
}

impl Location {
    pub fn namespace(&self) -> Namespace {
        match self {
            Location::Remote(_) => Namespace::Remote,
            Location::File(_) => Namespace::Local,
            Location::External(_) => Namespace::External,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Location::Remote(url) => Some(url),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Location::File(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Remote(url) => write!(f, "{url}"),
            Location::File(path) => write!(f, "{}", path.display()),
            Location::External(name) => write!(f, "{name}"),
        }
    }
}
