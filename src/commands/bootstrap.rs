use anyhow::Result;

use crate::application::{self, PackageInstaller, read_project_file};
use crate::build::CargoBuilder;
use crate::config::Config;
use crate::reporter::{ConsoleReporter, Reporter};
use crate::runtime::Runtime;
use crate::source::GitSource;

/// Install everything listed in the `Grovefile` of the current directory.
#[tracing::instrument(skip(runtime, config))]
pub fn bootstrap<R: Runtime>(runtime: R, link: bool, config: Config) -> Result<()> {
    let dir = runtime.current_dir()?;
    let packages = read_project_file(&runtime, &dir)?;
    let reporter = ConsoleReporter::new();
    if packages.is_empty() {
        reporter.success("Nothing to install.");
        return Ok(());
    }

    let source = GitSource::new(&runtime);
    let builder = CargoBuilder::new(&runtime);
    let installer = PackageInstaller::new(&runtime, &config, &source, &builder, &reporter);
    let done = application::bootstrap(&installer, packages, link)?;
    reporter.success(&format!("{} package(s) ready.", done.len()));
    Ok(())
}
