//! Application layer - use cases that coordinate the package, source, build
//! and link services.

mod bootstrap;
mod install;
mod list;
mod uninstall;

pub use bootstrap::{PROJECT_FILE, bootstrap, parse_project_file, read_project_file};
pub use install::{InstallOutcome, PackageInstaller, RESOURCE_MANIFEST};
pub use list::{InstalledPackage, installed_packages};
pub use uninstall::PackageUninstaller;
