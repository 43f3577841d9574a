use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use remora_fetch::FetchOptions;
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "remora.toml";

/// Prefix of environment variables overriding the config file.
pub const ENV_PREFIX: &str = "REMORA_";

/// Settings for one build.
///
/// Layered lowest to highest: built-in defaults, `remora.toml` (or an
/// explicit config file), `REMORA_*` environment variables, CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub entry_points: Vec<String>,
    pub outfile: PathBuf,
    /// Worker slots; half the logical CPUs when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,
    pub timeout_ms: u64,
    /// Total attempts per remote module.
    pub retries: u32,
    pub max_redirects: u32,
    /// Bare names treated like built-ins: never resolved on disk, never loaded.
    pub external: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry_points: vec!["test.js".to_string()],
            outfile: PathBuf::from("bundle.json"),
            max_concurrent: None,
            timeout_ms: 5000,
            retries: 3,
            max_redirects: 20,
            external: Vec::new(),
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_points: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outfile: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_redirects: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<Vec<String>>,
}

impl BuildConfig {
    /// Providers below the command line. An explicit `config_file` must exist;
    /// the default `remora.toml` is optional.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, figment::Error> {
        let file = match config_file {
            Some(path) if !path.is_file() => {
                return Err(figment::Error::from(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => Toml::file_exact(path),
            None => Toml::file(CONFIG_FILE),
        };

        Ok(Figment::from(Serialized::defaults(BuildConfig::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self, figment::Error> {
        Self::figment(config_file)?
            .merge(Serialized::defaults(overrides))
            .extract()
    }

    pub fn fetch_options(&self) -> FetchOptions {
        let options = FetchOptions::default()
            .timeout(Duration::from_millis(self.timeout_ms))
            .retries(self.retries)
            .max_redirects(self.max_redirects);
        match self.max_concurrent {
            Some(slots) => options.max_concurrent(slots),
            None => options,
        }
    }
}
