use anyhow::Result;
use std::path::PathBuf;

use crate::application::PackageInstaller;
use crate::build::CargoBuilder;
use crate::config::Config;
use crate::error::GroveError;
use crate::package::PackagePath;
use crate::reporter::ConsoleReporter;
use crate::runtime::Runtime;
use crate::source::GitSource;

use super::parse_package;

/// Path of the installed command for `spec`. Without a version the latest tag
/// is looked up, as `install` would.
#[tracing::instrument(skip(runtime, config))]
pub fn which<R: Runtime>(
    runtime: R,
    spec: &str,
    command: Option<&str>,
    config: Config,
) -> Result<PathBuf> {
    let mut package = parse_package(spec, command)?;

    let source = GitSource::new(&runtime);
    let builder = CargoBuilder::new(&runtime);
    let reporter = ConsoleReporter::errors_only();
    PackageInstaller::new(&runtime, &config, &source, &builder, &reporter)
        .ensure_version(&mut package)?;

    let paths = PackagePath::new(&config.packages_root, &package);
    if !runtime.exists(&paths.command_path) {
        return Err(GroveError::PackageNotFound {
            fragment: package.to_string(),
        }
        .into());
    }
    Ok(paths.command_path)
}
