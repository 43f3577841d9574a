//! Local file lookup strategies.
//!
//! This module defines the [`LocalLookup`] trait, the contract between the
//! resolver and the policy that maps a specifier to a file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Extensions probed when a specifier omits one, in order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js", ".css", ".json", ".mjs", ".cjs"];

pub trait LocalLookup {
    /// Find the file `specifier` names, relative to the directory `base`.
    fn lookup(&self, specifier: &str, base: &Path) -> Option<PathBuf>;
}

/// Try `primary`, then `fallback`.
#[derive(Debug, Clone)]
pub struct PairLookup<L1, L2> {
    primary: L1,
    fallback: L2,
}

impl<L1, L2> PairLookup<L1, L2>
where
    L1: LocalLookup,
    L2: LocalLookup,
{
    pub fn new(primary: L1, fallback: L2) -> Self {
        Self { primary, fallback }
    }
}

impl<L1, L2> LocalLookup for PairLookup<L1, L2>
where
    L1: LocalLookup,
    L2: LocalLookup,
{
    fn lookup(&self, specifier: &str, base: &Path) -> Option<PathBuf> {
        self.primary
            .lookup(specifier, base)
            .or_else(|| self.fallback.lookup(specifier, base))
    }
}

pub type DefaultLookup = PairLookup<RelativeLookup, ModulesLookup>;

impl Default for DefaultLookup {
    fn default() -> Self {
        PairLookup::new(RelativeLookup::default(), ModulesLookup::default())
    }
}

/// Path lookup relative to the importer's directory.
///
/// Accepts the exact path, then the path with each extension appended,
/// then `index` plus each extension inside it when it is a directory.
#[derive(Debug, Clone)]
pub struct RelativeLookup {
    extensions: Vec<String>,
}

impl Default for RelativeLookup {
    fn default() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl RelativeLookup {
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl LocalLookup for RelativeLookup {
    fn lookup(&self, specifier: &str, base: &Path) -> Option<PathBuf> {
        probe(&base.join(specifier), &self.extensions)
    }
}

/// Package lookup through `node_modules` directories of every ancestor.
///
/// Only bare specifiers (`pkg`, `pkg/sub/path`, `@scope/pkg`) are looked up.
/// A package root is entered through its `package.json` `module` or `main`
/// field, falling back to `index.*`.
#[derive(Debug, Clone)]
pub struct ModulesLookup {
    dir_name: String,
    extensions: Vec<String>,
}

impl Default for ModulesLookup {
    fn default() -> Self {
        Self {
            dir_name: "node_modules".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    module: Option<String>,
    main: Option<String>,
}

impl ModulesLookup {
    fn entry(&self, package_dir: &Path) -> Option<PathBuf> {
        let manifest = fs::read_to_string(package_dir.join("package.json"))
            .ok()
            .and_then(|text| serde_json::from_str::<PackageManifest>(&text).ok())
            .unwrap_or_default();

        [manifest.module, manifest.main]
            .into_iter()
            .flatten()
            .find_map(|field| probe(&package_dir.join(field), &self.extensions))
            .or_else(|| probe_index(package_dir, &self.extensions))
    }
}

impl LocalLookup for ModulesLookup {
    fn lookup(&self, specifier: &str, base: &Path) -> Option<PathBuf> {
        let (package, subpath) = split_package(specifier)?;

        base.ancestors().find_map(|dir| {
            let package_dir = dir.join(&self.dir_name).join(package);
            if !package_dir.is_dir() {
                return None;
            }
            match subpath {
                Some(subpath) => probe(&package_dir.join(subpath), &self.extensions),
                None => self.entry(&package_dir),
            }
        })
    }
}

/// Split a bare specifier into package name and optional sub-path.
fn split_package(specifier: &str) -> Option<(&str, Option<&str>)> {
    if specifier.is_empty()
        || specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.contains(':')
    {
        return None;
    }

    let name_len = if specifier.starts_with('@') {
        let scope_end = specifier.find('/')?;
        specifier[scope_end + 1..]
            .find('/')
            .map_or(specifier.len(), |i| scope_end + 1 + i)
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };

    let (package, rest) = specifier.split_at(name_len);
    let subpath = rest.strip_prefix('/').filter(|s| !s.is_empty());
    Some((package, subpath))
}

fn probe(path: &Path, extensions: &[String]) -> Option<PathBuf> {
    if path.is_file() {
        return canonical(path);
    }
    let with_extension = extensions.iter().find_map(|ext| {
        let mut candidate = path.as_os_str().to_owned();
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        candidate.is_file().then_some(candidate)
    });
    if let Some(found) = with_extension {
        return canonical(&found);
    }
    if path.is_dir() {
        return probe_index(path, extensions);
    }
    None
}

fn probe_index(dir: &Path, extensions: &[String]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("index{ext}")))
        .find(|candidate| candidate.is_file())
        .and_then(|found| canonical(&found))
}

fn canonical(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}
