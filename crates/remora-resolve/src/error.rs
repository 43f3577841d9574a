//! Error types for resolution.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("could not resolve '{specifier}'{}", importer_suffix(.importer))]
    NotFound {
        specifier: String,
        importer: Option<String>,
    },

    #[error("invalid URL '{specifier}'{}: {source}", importer_suffix(.importer))]
    InvalidUrl {
        specifier: String,
        importer: Option<String>,
        #[source]
        source: url::ParseError,
    },
}

impl ResolveError {
    pub fn specifier(&self) -> &str {
        match self {
            ResolveError::NotFound { specifier, .. } | ResolveError::InvalidUrl { specifier, .. } => {
                specifier
            }
        }
    }

    pub fn importer(&self) -> Option<&str> {
        match self {
            ResolveError::NotFound { importer, .. } | ResolveError::InvalidUrl { importer, .. } => {
                importer.as_deref()
            }
        }
    }
}

fn importer_suffix(importer: &Option<String>) -> String {
    importer
        .as_deref()
        .map(|importer| format!(" from '{importer}'"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ResolveError>;
