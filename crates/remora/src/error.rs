use std::io;
use std::path::PathBuf;

use remora_fetch::FetchError;
use remora_resolve::ResolveError;
use thiserror::Error;

/// Failure of one module during a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to load {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("external module '{0}' is not loadable")]
    External(String),
}
