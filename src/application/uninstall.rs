//! Uninstall use case.

use anyhow::Result;
use log::debug;

use crate::config::Config;
use crate::error::GroveError;
use crate::link::GlobalLinker;
use crate::package::{MetadataStore, package_dir};
use crate::reporter::Reporter;
use crate::runtime::Runtime;

pub struct PackageUninstaller<'a, R: Runtime, P: Reporter> {
    runtime: &'a R,
    reporter: &'a P,
    metadata: MetadataStore<'a, R>,
    linker: GlobalLinker<'a, R>,
    config: &'a Config,
}

impl<'a, R: Runtime, P: Reporter> PackageUninstaller<'a, R, P> {
    pub fn new(runtime: &'a R, config: &'a Config, reporter: &'a P) -> Self {
        Self {
            runtime,
            reporter,
            metadata: MetadataStore::new(runtime, &config.root),
            linker: GlobalLinker::new(runtime, &config.packages_root),
            config,
        }
    }

    /// Remove every package `fragment` refers to and return their locators.
    ///
    /// An exact locator selects only that package. When a fragment matches
    /// several packages nothing is removed unless `all_matches` is set, and
    /// then only after confirmation (skipped with `yes`).
    #[tracing::instrument(skip(self))]
    pub fn uninstall(&self, fragment: &str, all_matches: bool, yes: bool) -> Result<Vec<String>> {
        let metadata = self.metadata.read()?;
        let candidates = match self.metadata.resolve_repository(fragment) {
            Ok(locator) => vec![locator],
            Err(e) => {
                let ambiguous = match e.downcast_ref::<GroveError>() {
                    Some(GroveError::AmbiguousPackage { candidates, .. }) if all_matches => {
                        Some(candidates.clone())
                    }
                    _ => None,
                };
                ambiguous.ok_or(e)?
            }
        };

        if candidates.len() > 1 {
            let prompt = format!(
                "Remove {} packages: {}?",
                candidates.len(),
                candidates.join(", ")
            );
            if !yes && !self.runtime.confirm(&prompt)? {
                self.reporter.step("Nothing removed");
                return Ok(Vec::new());
            }
        }

        for locator in &candidates {
            let dir_name = metadata
                .packages
                .get(locator)
                .map(String::as_str)
                .unwrap_or_default();
            let sharing: Vec<&str> = metadata
                .packages
                .iter()
                .filter(|(other, dir)| *dir == dir_name && !candidates.contains(other))
                .map(|(other, _)| other.as_str())
                .collect();

            if sharing.is_empty() {
                self.remove_files(dir_name)?;
            } else {
                self.reporter.warn(&format!(
                    "{} shares its files with {}; keeping them",
                    locator,
                    sharing.join(", ")
                ));
            }
            self.metadata.remove_package(locator)?;
            self.reporter.success(&format!("Uninstalled {}", locator));
        }
        Ok(candidates)
    }

    /// Remove the links into a package directory, then the directory itself.
    fn remove_files(&self, dir_name: &str) -> Result<()> {
        let dir = package_dir(&self.config.packages_root, dir_name);

        for (link, target) in self.linker.managed_links(&self.config.link_dir, &dir)? {
            debug!("removing {:?} -> {:?}", link, target);
            self.linker
                .remove_link(&link)
                .map_err(|e| GroveError::io(&link, e))?;
            self.reporter
                .step(&format!("Removed link {}", link.display()));
        }

        if !dir_name.is_empty() && self.runtime.exists(&dir) {
            self.runtime
                .remove_dir_all(&dir)
                .map_err(|e| GroveError::io(&dir, e))?;
        }
        Ok(())
    }
}
