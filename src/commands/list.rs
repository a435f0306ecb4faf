use anyhow::Result;
use log::debug;

use crate::application::installed_packages;
use crate::config::Config;
use crate::runtime::Runtime;

/// Print installed packages with their built versions; the linked one is
/// marked with `*`.
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    debug!("Listing packages from {:?}", config.root);
    let packages = installed_packages(&runtime, &config)?;
    if packages.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    for package in packages {
        let versions = if package.versions.is_empty() {
            "(no builds)".to_string()
        } else {
            package
                .versions
                .iter()
                .map(|v| match &package.linked {
                    Some((linked, _)) if linked == v => format!("{}*", v),
                    _ => v.clone(),
                })
                .collect::<Vec<_>>()
                .join(" ")
        };
        println!("{} {}", package.repository, versions);
    }
    Ok(())
}
