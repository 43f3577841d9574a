use std::sync::Arc;

use bytes::Bytes;
use remora_fetch::{EventSink, FetchQueue};
use remora_resolve::{Location, Resolver};

use crate::error::BuildError;

/// Body of a loaded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub contents: Bytes,
    /// Importer identity for the module's own imports: the final URL after
    /// redirects, or the file path.
    pub base: Location,
}

/// Routes resolution to the [`Resolver`] and loading to the filesystem or
/// the [`FetchQueue`], by namespace.
pub struct Loader {
    resolver: Resolver,
    queue: FetchQueue,
    sink: Arc<dyn EventSink>,
}

impl Loader {
    pub fn new(resolver: Resolver, queue: FetchQueue, sink: Arc<dyn EventSink>) -> Self {
        Self { resolver, queue, sink }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Resolve an import; `importer` is `None` for entry points.
    pub fn on_resolve(&self, specifier: &str, importer: Option<&Location>) -> Result<Location, BuildError> {
        let location = self.resolver.resolve(specifier, importer)?;
        tracing::trace!(specifier, %location, namespace = %location.namespace(), "resolved");
        Ok(location)
    }

    /// Load a resolved module's contents.
    ///
    /// # Errors
    ///
    /// Remote loads fail once the fetch queue gives up on the URL, local
    /// loads on read errors. External modules are never loaded.
    pub async fn on_load(&self, location: &Location) -> Result<Loaded, BuildError> {
        match location {
            Location::Remote(url) => {
                let fetched = self
                    .queue
                    .fetch_and_cache(url)
                    .await
                    .map_err(|source| BuildError::Fetch {
                        url: url.to_string(),
                        source,
                    })?;
                Ok(Loaded {
                    contents: fetched.body,
                    base: Location::Remote(fetched.url),
                })
            }
            Location::File(path) => {
                let name = format!("file://{}", path.display());
                self.sink.module_started(&name);
                let contents = tokio::fs::read(path).await.map_err(|source| BuildError::Read {
                    path: path.clone(),
                    source,
                })?;
                self.sink.module_completed(&name);
                Ok(Loaded {
                    contents: Bytes::from(contents),
                    base: location.clone(),
                })
            }
            Location::External(name) => Err(BuildError::External(name.clone())),
        }
    }
}
