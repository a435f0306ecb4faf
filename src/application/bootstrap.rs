//! Project bootstrap from a `Grovefile`.
//!
//! ```text
//! # tools this project needs
//! owner/formatter@1.4.0
//! https://git.example.com/team/linter.git  lint
//! ```
//!
//! One package spec per line, optionally followed by the command name.

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::build::Builder;
use crate::error::GroveError;
use crate::package::Package;
use crate::reporter::Reporter;
use crate::runtime::Runtime;
use crate::source::VersionControl;

use super::{InstallOutcome, PackageInstaller};

pub const PROJECT_FILE: &str = "Grovefile";

/// Parse a project file into packages. Blank lines and `#` comments are skipped.
pub fn parse_project_file(content: &str) -> Result<Vec<Package>> {
    let mut packages = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(spec), command) = (fields.next(), fields.next()) else {
            continue;
        };
        if fields.next().is_some() {
            bail!("{}:{}: expected '<spec> [command]'", PROJECT_FILE, index + 1);
        }

        let mut package: Package = spec
            .parse()
            .with_context(|| format!("{}:{}", PROJECT_FILE, index + 1))?;
        if let Some(command) = command {
            package.name = command.to_string();
        }
        packages.push(package);
    }
    Ok(packages)
}

/// Read `<dir>/Grovefile`.
pub fn read_project_file<R: Runtime>(runtime: &R, dir: &Path) -> Result<Vec<Package>> {
    let path = dir.join(PROJECT_FILE);
    if !runtime.exists(&path) {
        bail!("no {} in {}", PROJECT_FILE, dir.display());
    }
    let content = runtime
        .read_to_string(&path)
        .map_err(|e| GroveError::io(&path, e))?;
    parse_project_file(&content)
}

/// Install every package in order, stopping at the first failure.
#[tracing::instrument(skip(installer, packages))]
pub fn bootstrap<R: Runtime, V: VersionControl, B: Builder, P: Reporter>(
    installer: &PackageInstaller<'_, R, V, B, P>,
    packages: Vec<Package>,
    global: bool,
) -> Result<Vec<(Package, InstallOutcome)>> {
    let mut done = Vec::with_capacity(packages.len());
    for mut package in packages {
        let outcome = installer
            .install(&mut package, false, global)
            .with_context(|| format!("bootstrapping {}", package))?;
        done.push((package, outcome));
    }
    Ok(done)
}
