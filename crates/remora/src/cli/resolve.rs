use anyhow::{Context, Result};
use remora_resolve::{Location, Resolver};
use url::Url;

use crate::cli::app::ResolveArg;
use crate::config::{BuildConfig, Overrides};

pub fn resolve(arg: ResolveArg) -> Result<bool> {
    let config = BuildConfig::load(arg.config.as_deref(), &Overrides::default())
        .context("failed to load configuration")?;
    let cwd = std::env::current_dir().context("failed to read the working directory")?;

    let importer = match arg.importer.as_deref() {
        Some(importer) if importer.contains("://") => Some(Location::Remote(
            Url::parse(importer).with_context(|| format!("invalid importer URL {importer}"))?,
        )),
        Some(importer) => Some(Location::File(cwd.join(importer))),
        None => None,
    };

    let resolver = Resolver::new(cwd).externals(config.external);
    let location = resolver.resolve(&arg.specifier, importer.as_ref())?;
    println!("{}\t{location}", location.namespace());
    Ok(true)
}
