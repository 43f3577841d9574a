mod app;
mod build;
mod resolve;

pub use app::{App, BuildArg, Commands, ResolveArg};

use anyhow::Result;

/// Run a parsed command line; `Ok(false)` means the command ran but failed.
pub async fn run(app: App) -> Result<bool> {
    match app.cmd {
        Commands::Build(arg) => build::build(arg).await,
        Commands::Resolve(arg) => resolve::resolve(arg),
    }
}
