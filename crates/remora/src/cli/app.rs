use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Overrides;

#[derive(Clone, Debug, Parser)]
#[command(name = "remora", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// Log verbosity: -v info, -vv debug, -vvv trace. `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "b", name = "build", about = "Load the import graph of the entry points")]
    Build(BuildArg),
    #[command(alias = "r", name = "resolve", about = "Print where a specifier resolves to")]
    Resolve(ResolveArg),
}

#[derive(Args, Clone, Debug, Default)]
pub struct BuildArg {
    /// Entry points, relative to the working directory [default: test.js]
    pub entry_points: Vec<String>,

    /// Where the module map is written [default: bundle.json]
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,

    /// Config file; `remora.toml` in the working directory otherwise.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Concurrent fetches [default: half the logical CPUs]
    #[arg(short = 'j', long)]
    pub max_concurrent: Option<usize>,

    /// Per-fetch deadline in milliseconds [default: 5000]
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Total attempts per remote module [default: 3]
    #[arg(long)]
    pub retries: Option<u32>,

    /// Redirects followed per fetch [default: 20]
    #[arg(long)]
    pub max_redirects: Option<u32>,

    /// Treat a package as external; repeatable.
    #[arg(short, long = "external", value_name = "NAME")]
    pub external: Vec<String>,
}

impl BuildArg {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            entry_points: non_empty(&self.entry_points),
            outfile: self.outfile.clone(),
            max_concurrent: self.max_concurrent,
            timeout_ms: self.timeout_ms,
            retries: self.retries,
            max_redirects: self.max_redirects,
            external: non_empty(&self.external),
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct ResolveArg {
    pub specifier: String,

    /// Importing module: a file path or an http(s) URL. Entry-point rules apply when absent.
    #[arg(long = "from", value_name = "IMPORTER")]
    pub importer: Option<String>,

    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}
