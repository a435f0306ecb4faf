use anyhow::Result;
use log::debug;

use crate::application::PackageInstaller;
use crate::build::CargoBuilder;
use crate::config::Config;
use crate::package::PackagePath;
use crate::reporter::ConsoleReporter;
use crate::runtime::{ProcessCommand, Runtime};
use crate::source::GitSource;

use super::parse_package;

/// Install `spec` if needed, then run its command with `args`. Returns the
/// command's exit code.
#[tracing::instrument(skip(runtime, config))]
pub fn run<R: Runtime>(
    runtime: R,
    spec: &str,
    command: Option<&str>,
    args: &[String],
    config: Config,
) -> Result<i32> {
    let mut package = parse_package(spec, command)?;

    let source = GitSource::new(&runtime);
    let builder = CargoBuilder::new(&runtime);
    let reporter = ConsoleReporter::errors_only();
    PackageInstaller::new(&runtime, &config, &source, &builder, &reporter)
        .install(&mut package, false, false)?;

    let command_path = PackagePath::new(&config.packages_root, &package).command_path;
    let process = ProcessCommand::new(command_path.to_string_lossy()).args(args.iter().cloned());
    debug!("Running {}", process);
    runtime.run_interactive(&process)
}
