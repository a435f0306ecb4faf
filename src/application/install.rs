//! Install use case: resolve, fetch, build, place and record one package.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};

use crate::build::Builder;
use crate::cleanup::ScratchDir;
use crate::config::Config;
use crate::error::GroveError;
use crate::link::{GlobalLinker, LinkOutcome};
use crate::package::{MetadataStore, Package, PackagePath, VersionResolver};
use crate::reporter::Reporter;
use crate::runtime::{Runtime, is_path_under};
use crate::source::VersionControl;

/// Manifest in a checkout listing extra files to install next to the binary.
pub const RESOURCE_MANIFEST: &str = "grove.resources";

const EXECUTABLE_MODE: u32 = 0o755;

/// What `install` did with the package itself. Linking is reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

pub struct PackageInstaller<'a, R: Runtime, V: VersionControl, B: Builder, P: Reporter> {
    runtime: &'a R,
    source: &'a V,
    builder: &'a B,
    reporter: &'a P,
    metadata: MetadataStore<'a, R>,
    linker: GlobalLinker<'a, R>,
    config: &'a Config,
}

impl<'a, R: Runtime, V: VersionControl, B: Builder, P: Reporter> PackageInstaller<'a, R, V, B, P> {
    pub fn new(
        runtime: &'a R,
        config: &'a Config,
        source: &'a V,
        builder: &'a B,
        reporter: &'a P,
    ) -> Self {
        Self {
            runtime,
            source,
            builder,
            reporter,
            metadata: MetadataStore::new(runtime, &config.root),
            linker: GlobalLinker::new(runtime, &config.packages_root),
            config,
        }
    }

    /// Install `package`, resolving its version first when it has none.
    ///
    /// With `update` unset an existing binary for the same version is reused.
    /// With `global` set the command is also linked into the link directory;
    /// the link result never fails the install.
    #[tracing::instrument(skip(self))]
    pub fn install(
        &self,
        package: &mut Package,
        update: bool,
        global: bool,
    ) -> Result<InstallOutcome> {
        package.validate()?;
        self.ensure_version(package)?;

        let paths = PackagePath::new(&self.config.packages_root, package);
        if !update && self.runtime.exists(&paths.command_path) {
            info!("{} already present at {:?}", package, paths.command_path);
            if global {
                self.metadata
                    .record_package(&package.repository, &paths.dir_name)?;
                self.link(package, &paths);
            } else {
                self.reporter
                    .success(&format!("{} is already installed", package));
            }
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        self.build_into(package, &paths)?;
        self.metadata
            .record_package(&package.repository, &paths.dir_name)?;
        self.reporter.success(&format!(
            "Installed {} to {}",
            package,
            paths.command_path.display()
        ));

        if global {
            self.link(package, &paths);
        }
        Ok(InstallOutcome::Installed)
    }

    /// Fill in `package.version` from the repository's tags if it is empty.
    #[tracing::instrument(skip(self))]
    pub fn ensure_version(&self, package: &mut Package) -> Result<()> {
        if package.has_version() {
            return Ok(());
        }

        self.reporter
            .step(&format!("Looking up tags of {}", package.repository));
        let output = self
            .source
            .list_tags(&package.repository)
            .map_err(|source| GroveError::RepositoryNotFound {
                locator: package.repository.clone(),
                source,
            })?;
        let resolution = VersionResolver::resolve(&output);

        if resolution.tags.is_empty() {
            self.reporter.step("No tags found");
        } else {
            self.reporter
                .step(&format!("Found tags: {}", resolution.tags.join(", ")));
        }
        if resolution.fell_back {
            self.reporter.step(&format!(
                "No version tag, using branch {}",
                resolution.version
            ));
        } else {
            self.reporter
                .step(&format!("Using version {}", resolution.version));
        }

        package.version = resolution.version;
        Ok(())
    }

    fn build_into(&self, package: &Package, paths: &PackagePath) -> Result<()> {
        let scratch = ScratchDir::claim(self.runtime, &paths.checkout_dir);
        if let Some(parent) = scratch.path().parent() {
            self.runtime
                .create_dir_all(parent)
                .map_err(|e| GroveError::io(parent, e))?;
        }

        self.reporter
            .step(&format!("Cloning {} at {}", package.repository, package.version));
        self.source
            .clone_ref(&package.repository, &package.version, scratch.path())
            .map_err(|source| GroveError::RepositoryNotFound {
                locator: package.repository.clone(),
                source,
            })?;

        self.reporter.step(&format!("Building {}", package.name));
        self.builder
            .build(scratch.path())
            .map_err(|source| GroveError::BuildFailed {
                locator: package.repository.clone(),
                version: package.version.clone(),
                source,
            })?;

        let artifact = self.builder.artifact_path(scratch.path(), &package.name);
        if !self.runtime.exists(&artifact) {
            debug!("expected build output at {:?}", artifact);
            return Err(GroveError::InvalidCommand {
                locator: package.repository.clone(),
                name: package.name.clone(),
            }
            .into());
        }

        self.place(&artifact, scratch.path(), paths)
    }

    fn place(&self, artifact: &Path, checkout: &Path, paths: &PackagePath) -> Result<()> {
        let install_dir = &paths.install_dir;
        if self.runtime.exists(install_dir) {
            self.runtime
                .remove_dir_all(install_dir)
                .map_err(|e| GroveError::io(install_dir, e))?;
        }
        self.runtime
            .create_dir_all(install_dir)
            .map_err(|e| GroveError::io(install_dir, e))?;

        self.runtime
            .copy(artifact, &paths.command_path)
            .map_err(|e| GroveError::io(&paths.command_path, e))?;
        self.runtime
            .set_permissions(&paths.command_path, EXECUTABLE_MODE)
            .map_err(|e| GroveError::io(&paths.command_path, e))?;

        self.place_resources(checkout, install_dir)
    }

    fn place_resources(&self, checkout: &Path, install_dir: &Path) -> Result<()> {
        let manifest = checkout.join(RESOURCE_MANIFEST);
        if !self.runtime.exists(&manifest) {
            return Ok(());
        }

        let content = self
            .runtime
            .read_to_string(&manifest)
            .map_err(|e| GroveError::io(&manifest, e))?;
        for entry in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let resource = checkout.join(entry);
            let file_name = match resource.file_name() {
                Some(name) if is_path_under(&resource, checkout) => name,
                _ => {
                    self.reporter
                        .warn(&format!("Skipping resource '{}' outside the checkout", entry));
                    continue;
                }
            };
            if !self.runtime.exists(&resource) {
                self.reporter.warn(&format!(
                    "Resource '{}' listed in {} does not exist",
                    entry, RESOURCE_MANIFEST
                ));
                continue;
            }

            let dest = install_dir.join(file_name);
            self.reporter.step(&format!("Copying {}", entry));
            copy_recursive(self.runtime, &resource, &dest)?;
        }
        Ok(())
    }

    fn link(&self, package: &Package, paths: &PackagePath) -> LinkOutcome {
        let target = self.config.link_path(&package.name);
        let outcome = self.linker.link_globally(&paths.command_path, &target);
        match &outcome {
            LinkOutcome::Linked => self
                .reporter
                .success(&format!("Linked {} -> {}", target.display(), package)),
            LinkOutcome::Replaced { previous_version } => self.reporter.success(&format!(
                "Replaced {} {} with {} at {}",
                package.name,
                previous_version,
                package.version,
                target.display()
            )),
            LinkOutcome::Declined => self
                .reporter
                .step(&format!("Left {} untouched", target.display())),
            LinkOutcome::Failed(reason) => self.reporter.warn(&format!(
                "Could not link {}: {}",
                target.display(),
                reason
            )),
        }
        outcome
    }
}

fn copy_recursive<R: Runtime>(runtime: &R, from: &Path, to: &Path) -> Result<()> {
    if runtime.is_dir(from) {
        runtime
            .create_dir_all(to)
            .map_err(|e| GroveError::io(to, e))?;
        let entries: Vec<PathBuf> = runtime
            .read_dir(from)
            .map_err(|e| GroveError::io(from, e))?;
        for entry in entries {
            if let Some(name) = entry.file_name() {
                copy_recursive(runtime, &entry, &to.join(name))?;
            }
        }
    } else {
        runtime.copy(from, to).map_err(|e| GroveError::io(to, e))?;
    }
    Ok(())
}
