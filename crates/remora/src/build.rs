use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use remora_resolve::Location;
use serde::Serialize;

use crate::adapter::{Loaded, Loader};
use crate::error::BuildError;
use crate::scan::scan_imports;

/// A loaded module, keyed by its canonical location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub location: Location,
    pub contents: Bytes,
}

/// Outcome of crawling an import graph.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Every module loaded, ordered by location.
    pub modules: Vec<Module>,
    /// Built-ins and configured externals that were imported.
    pub externals: BTreeSet<String>,
    pub failures: Vec<BuildError>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn module(&self, location: &Location) -> Option<&Module> {
        self.modules.iter().find(|module| &module.location == location)
    }

    /// Serializable module map: location to source text, plus externals.
    pub fn manifest(&self) -> Manifest<'_> {
        Manifest {
            modules: self
                .modules
                .iter()
                .map(|module| (module.location.to_string(), String::from_utf8_lossy(&module.contents)))
                .collect(),
            externals: &self.externals,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub modules: BTreeMap<String, Cow<'a, str>>,
    pub externals: &'a BTreeSet<String>,
}

type Pending<'a> = BoxFuture<'a, (Location, Result<Loaded, BuildError>)>;

struct Crawl<'a> {
    loader: &'a Loader,
    seen: HashSet<Location>,
    pending: FuturesUnordered<Pending<'a>>,
    report: BuildReport,
}

/// Crawl the import graph reachable from `entries`.
///
/// Every distinct location is loaded once, remote ones through the fetch
/// queue so they share its slots and cache. A failing module is recorded and
/// reported to the loader's sink; the rest of the graph still loads.
pub async fn build(loader: &Loader, entries: &[String]) -> BuildReport {
    let mut crawl = Crawl {
        loader,
        seen: HashSet::new(),
        pending: FuturesUnordered::new(),
        report: BuildReport::default(),
    };

    for entry in entries {
        crawl.visit(&entry_specifier(entry), None);
    }
    while let Some((location, outcome)) = crawl.pending.next().await {
        crawl.settle(location, outcome);
    }

    let mut report = crawl.report;
    report.modules.sort_by(|a, b| a.location.cmp(&b.location));
    tracing::info!(
        modules = report.modules.len(),
        externals = report.externals.len(),
        failures = report.failures.len(),
        "build finished"
    );
    report
}

impl<'a> Crawl<'a> {
    fn visit(&mut self, specifier: &str, importer: Option<&Location>) {
        match self.loader.on_resolve(specifier, importer) {
            Ok(Location::External(name)) => {
                self.report.externals.insert(name);
            }
            Ok(location) => {
                if self.seen.insert(location.clone()) {
                    self.load(location);
                }
            }
            Err(err) => self.fail(err),
        }
    }

    fn load(&mut self, location: Location) {
        let loader = self.loader;
        self.pending.push(
            async move {
                let outcome = loader.on_load(&location).await;
                (location, outcome)
            }
            .boxed(),
        );
    }

    fn settle(&mut self, location: Location, outcome: Result<Loaded, BuildError>) {
        let loaded = match outcome {
            Ok(loaded) => loaded,
            Err(err) => return self.fail(err),
        };

        // redirected onto a module that is crawled on its own
        if loaded.base != location && !self.seen.insert(loaded.base.clone()) {
            tracing::debug!(%location, base = %loaded.base, "already crawled");
            return;
        }

        let imports = scan_imports(&String::from_utf8_lossy(&loaded.contents));
        tracing::debug!(base = %loaded.base, imports = imports.len(), "scanned");
        for specifier in &imports {
            self.visit(specifier, Some(&loaded.base));
        }

        self.report.modules.push(Module {
            location: loaded.base,
            contents: loaded.contents,
        });
    }

    fn fail(&mut self, err: BuildError) {
        self.loader.sink().error(&err.to_string());
        self.report.failures.push(err);
    }
}

/// Entry points name files relative to the working directory, even without
/// a leading `./`.
fn entry_specifier(entry: &str) -> Cow<'_, str> {
    let explicit = entry.starts_with('.')
        || entry.contains("://")
        || Path::new(entry).is_absolute();
    if explicit {
        Cow::Borrowed(entry)
    } else {
        Cow::Owned(format!("./{entry}"))
    }
}
