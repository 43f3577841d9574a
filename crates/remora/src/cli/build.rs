use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use remora_fetch::{ContentCache, EventSink, FetchQueue, Fetcher, ReqwestClient};
use remora_resolve::Resolver;

use crate::adapter::Loader;
use crate::build::{BuildReport, build as crawl};
use crate::cli::app::BuildArg;
use crate::config::BuildConfig;
use crate::ui::ProgressSink;

pub async fn build(arg: BuildArg) -> Result<bool> {
    let config = BuildConfig::load(arg.config.as_deref(), &arg.overrides())
        .context("failed to load configuration")?;
    tracing::debug!(?config, "configuration");

    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let progress = Arc::new(ProgressSink::new("Loading"));
    let sink: Arc<dyn EventSink> = progress.clone();

    let client = ReqwestClient::new().context("failed to build the HTTP client")?;
    let fetcher = Fetcher::new(client, config.fetch_options()).with_sink(Arc::clone(&sink));
    let queue = FetchQueue::new(fetcher, Arc::new(ContentCache::new()));
    let resolver = Resolver::new(cwd).externals(config.external.iter().cloned());
    let loader = Loader::new(resolver, queue, sink);

    let report = crawl(&loader, &config.entry_points).await;
    progress.finish(summary(&report));

    write_manifest(&report, &config.outfile)?;
    Ok(report.is_success())
}

fn summary(report: &BuildReport) -> String {
    match report.failures.len() {
        0 => format!("✅ {} modules", report.modules.len()),
        failed => format!("❌ {} modules, {failed} failed", report.modules.len()),
    }
}

fn write_manifest(report: &BuildReport, outfile: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(&report.manifest()).context("failed to serialize the module map")?;
    std::fs::write(outfile, json).with_context(|| format!("failed to write {}", outfile.display()))?;
    tracing::info!(outfile = %outfile.display(), "module map written");
    Ok(())
}
