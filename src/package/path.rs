//! On-disk layout of an installed package.

use std::path::{Path, PathBuf};

use super::Package;

/// Directory under a package's root holding one subdirectory per built version.
pub const BUILD_DIR: &str = "build";
/// Directory under a package's root holding scratch checkouts.
pub const CHECKOUT_DIR: &str = "checkout";

/// Paths derived from `(packages_root, package)`.
///
/// Layout:
/// ```text
/// <packages_root>/<dir_name>/
///   build/<version>/<name>    installed command + resources
///   checkout/<version>/       scratch clone, removed after every install
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePath {
    pub dir_name: String,
    pub package_dir: PathBuf,
    pub install_dir: PathBuf,
    pub command_path: PathBuf,
    pub checkout_dir: PathBuf,
}

impl PackagePath {
    pub fn new(packages_root: &Path, package: &Package) -> Self {
        let dir_name = local_dir_name(&package.repository);
        let package_dir = package_dir(packages_root, &dir_name);
        let version_dir = version_dir_name(&package.version);
        let install_dir = package_dir.join(BUILD_DIR).join(&version_dir);
        let command_path = install_dir.join(command_file_name(&package.name));
        let checkout_dir = package_dir.join(CHECKOUT_DIR).join(&version_dir);

        Self {
            dir_name,
            package_dir,
            install_dir,
            command_path,
            checkout_dir,
        }
    }
}

/// Directory name for a repository locator: scheme and `.git` suffix dropped,
/// separators flattened to `_`.
///
/// `https://github.com/owner/tool.git` -> `github.com_owner_tool`
pub fn local_dir_name(locator: &str) -> String {
    let without_scheme = locator
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(locator);
    let trimmed = without_scheme.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    trimmed
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '@' => '_',
            c => c,
        })
        .collect()
}

/// Package directory for a stored directory name.
pub fn package_dir(packages_root: &Path, dir_name: &str) -> PathBuf {
    packages_root.join(dir_name)
}

/// Versions are refs and may contain `/` (e.g. `release/1.x`); each version
/// gets exactly one directory level.
pub fn version_dir_name(version: &str) -> String {
    version.replace(['/', '\\'], "_")
}

/// File name of an installed command on this platform.
pub fn command_file_name(name: &str) -> String {
    format!("{}{}", name, std::env::consts::EXE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_packages_root;

    #[test]
    fn test_local_dir_name_for_urls() {
        assert_eq!(
            local_dir_name("https://github.com/owner/tool.git"),
            "github.com_owner_tool"
        );
        assert_eq!(
            local_dir_name("git@github.com:owner/tool.git"),
            "git_github.com_owner_tool"
        );
        assert_eq!(
            local_dir_name("ssh://git@host:2222/owner/tool"),
            "git_host_2222_owner_tool"
        );
    }

    #[test]
    fn test_package_path_layout() {
        let root = test_packages_root();
        let package = Package::new("owner/tool", "1.2.0", None);
        let path = PackagePath::new(&root, &package);

        let package_dir = root.join("github.com_owner_tool");
        assert_eq!(path.dir_name, "github.com_owner_tool");
        assert_eq!(path.package_dir, package_dir);
        assert_eq!(path.install_dir, package_dir.join("build").join("1.2.0"));
        assert_eq!(
            path.command_path,
            package_dir
                .join("build")
                .join("1.2.0")
                .join(command_file_name("tool"))
        );
        assert_eq!(
            path.checkout_dir,
            package_dir.join("checkout").join("1.2.0")
        );
    }

    #[test]
    fn test_stored_dir_name_round_trips() {
        let root = test_packages_root();
        let package = Package::new("owner/tool", "1.2.0", None);
        let path = PackagePath::new(&root, &package);

        assert_eq!(package_dir(&root, &path.dir_name), path.package_dir);
    }

    #[test]
    fn test_branch_version_is_single_directory() {
        let root = test_packages_root();
        let package = Package::new("owner/tool", "release/1.x", None);
        let path = PackagePath::new(&root, &package);

        assert_eq!(
            path.install_dir.file_name().unwrap().to_str().unwrap(),
            "release_1.x"
        );
    }

    #[test]
    fn test_path_is_deterministic() {
        let root = test_packages_root();
        let a = PackagePath::new(&root, &Package::new("owner/tool", "2.0.0", None));
        let b = PackagePath::new(
            &root,
            &Package::new("https://github.com/owner/tool.git", "2.0.0", None),
        );
        assert_eq!(a, b);
    }
}
