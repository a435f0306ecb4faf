//! CLI-facing commands. Each one wires the real git, cargo and console
//! services into an application use case.

mod bootstrap;
mod install;
mod list;
mod run;
mod uninstall;
mod which;

use anyhow::Result;

use crate::package::Package;

pub use bootstrap::bootstrap;
pub use install::install;
pub use list::list;
pub use run::run;
pub use uninstall::uninstall;
pub use which::which;

/// Parse `<locator>[@<version>]`, overriding the command name when given.
fn parse_package(spec: &str, command: Option<&str>) -> Result<Package> {
    let mut package: Package = spec.parse()?;
    if let Some(command) = command {
        package.name = command.to_string();
        package.validate()?;
    }
    Ok(package)
}
