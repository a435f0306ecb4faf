use anyhow::Result;

use crate::application::PackageUninstaller;
use crate::config::Config;
use crate::reporter::ConsoleReporter;
use crate::runtime::Runtime;

#[tracing::instrument(skip(runtime, config))]
pub fn uninstall<R: Runtime>(
    runtime: R,
    fragment: &str,
    all: bool,
    yes: bool,
    config: Config,
) -> Result<()> {
    let reporter = ConsoleReporter::new();
    PackageUninstaller::new(&runtime, &config, &reporter).uninstall(fragment, all, yes)?;
    Ok(())
}
