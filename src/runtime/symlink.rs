//! Symlink operations (create, resolve, remove).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;
use super::path::normalize_path;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink as unix_symlink;
            unix_symlink(original, link).context("Failed to create symlink")?;
        }
        #[cfg(windows)]
        {
            use anyhow::bail;
            use std::os::windows::fs::symlink_file;

            // Installed commands are always files
            symlink_file(original, link).context("Failed to create file symlink")?;

            if fs::symlink_metadata(link).is_err() {
                bail!(
                    "Symlink creation reported success but link does not exist: link={:?} target={:?}",
                    link,
                    original
                );
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn resolve_link_impl(&self, path: &Path) -> Result<PathBuf> {
        let target = fs::read_link(path).context("Failed to read symlink")?;
        if target.is_absolute() {
            Ok(target)
        } else {
            let parent = path
                .parent()
                .context("Failed to get parent directory of symlink")?;
            Ok(normalize_path(&parent.join(&target)))
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            fs::remove_file(path).context("Failed to remove symlink")?;
        }
        #[cfg(windows)]
        {
            fs::remove_file(path)
                .or_else(|_| fs::remove_dir(path))
                .context("Failed to remove symlink")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[cfg_attr(
        grove_skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set GROVE_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_real_runtime_file_symlink() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();

        let target = dir.path().join("tool");
        runtime.write(&target, b"binary").unwrap();

        let link = dir.path().join("bin-tool");
        runtime.symlink(&target, &link).unwrap();
        assert!(runtime.is_symlink(&link));
        assert!(!runtime.is_symlink(&target));
        assert_eq!(runtime.read_to_string(&link).unwrap(), "binary");

        runtime.remove_symlink(&link).unwrap();
        assert!(!runtime.exists(&link));
        assert!(runtime.exists(&target));
    }

    #[cfg_attr(
        grove_skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set GROVE_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_resolve_link_absolute_target() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        runtime.write(&target, b"x").unwrap();

        let link = dir.path().join("link");
        runtime.symlink(&target, &link).unwrap();
        assert_eq!(runtime.resolve_link(&link).unwrap(), target);
    }

    #[cfg_attr(
        grove_skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set GROVE_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_resolve_link_relative_target_parent_dir() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let build = dir.path().join("packages/x/build/1.0.0");
        runtime.create_dir_all(&build).unwrap();
        runtime.write(&build.join("tool"), b"x").unwrap();

        let bin = dir.path().join("bin");
        runtime.create_dir_all(&bin).unwrap();
        let link = bin.join("tool");
        runtime
            .symlink(std::path::Path::new("../packages/x/build/1.0.0/tool"), &link)
            .unwrap();

        assert_eq!(runtime.resolve_link(&link).unwrap(), build.join("tool"));
    }

    #[test]
    fn test_dangling_symlink_is_still_symlink() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let link = dir.path().join("dangling");
        #[cfg(unix)]
        {
            runtime
                .symlink(&dir.path().join("missing"), &link)
                .unwrap();
            assert!(runtime.is_symlink(&link));
            assert!(!runtime.exists(&link));
        }
        #[cfg(not(unix))]
        let _ = (runtime, link);
    }
}
