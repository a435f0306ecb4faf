use anyhow::Result;
use log::debug;

use crate::application::{InstallOutcome, PackageInstaller};
use crate::build::CargoBuilder;
use crate::config::Config;
use crate::reporter::ConsoleReporter;
use crate::runtime::Runtime;
use crate::source::GitSource;

use super::parse_package;

/// Install one package, optionally linking it into the link directory.
#[tracing::instrument(skip(runtime, config))]
pub fn install<R: Runtime>(
    runtime: R,
    spec: &str,
    command: Option<&str>,
    update: bool,
    link: bool,
    config: Config,
) -> Result<InstallOutcome> {
    let mut package = parse_package(spec, command)?;
    debug!("Installing {} into {:?}", package, config.packages_root);

    let source = GitSource::new(&runtime);
    let builder = CargoBuilder::new(&runtime);
    let reporter = ConsoleReporter::new();
    let installer = PackageInstaller::new(&runtime, &config, &source, &builder, &reporter);
    installer.install(&mut package, update, link)
}
