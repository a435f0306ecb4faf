//! Listing installed packages.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::link::GlobalLinker;
use crate::package::{BUILD_DIR, MetadataStore, VersionResolver, package_dir};
use crate::runtime::Runtime;

/// One recorded package and what is on disk for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub repository: String,
    pub dir_name: String,
    /// Built versions, oldest first.
    pub versions: Vec<String>,
    /// Version the global link points at, with the link itself.
    pub linked: Option<(String, PathBuf)>,
}

#[tracing::instrument(skip(runtime))]
pub fn installed_packages<R: Runtime>(
    runtime: &R,
    config: &Config,
) -> Result<Vec<InstalledPackage>> {
    let metadata = MetadataStore::new(runtime, &config.root).read()?;
    let linker = GlobalLinker::new(runtime, &config.packages_root);

    let mut packages = Vec::with_capacity(metadata.packages.len());
    for (repository, dir_name) in metadata.packages {
        let dir = package_dir(&config.packages_root, &dir_name);
        let build_dir = dir.join(BUILD_DIR);

        let mut versions: Vec<String> = if runtime.is_dir(&build_dir) {
            runtime
                .read_dir(&build_dir)?
                .into_iter()
                .filter(|p| runtime.is_dir(p))
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect()
        } else {
            Vec::new()
        };
        VersionResolver::sort_versions(&mut versions);

        let linked = linker
            .managed_links(&config.link_dir, &dir)?
            .into_iter()
            .next()
            .and_then(|(link, target)| {
                let version = target.parent()?.file_name()?.to_string_lossy().into_owned();
                Some((version, link))
            });

        packages.push(InstalledPackage {
            repository,
            dir_name,
            versions,
            linked,
        });
    }
    Ok(packages)
}
