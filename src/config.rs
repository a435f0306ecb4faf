//! Where grove keeps its state and where it exposes commands.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::package::command_file_name;
use crate::runtime::Runtime;
use crate::runtime::path::normalize_path;

/// Directory under the root holding one directory per repository.
pub const PACKAGES_DIR: &str = "packages";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `~/.grove` unless overridden; holds `metadata.json`.
    pub root: PathBuf,
    pub packages_root: PathBuf,
    /// Directory receiving global command links.
    pub link_dir: PathBuf,
}

impl Config {
    /// Resolve the layout. `root` and `link_dir` come from the command line or
    /// the environment (`GROVE_ROOT`, `GROVE_LINK_DIR`); missing ones fall back
    /// to the defaults.
    #[tracing::instrument(skip(runtime))]
    pub fn new<R: Runtime>(
        runtime: &R,
        root: Option<PathBuf>,
        link_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let root = match root {
            Some(path) => absolute(runtime, path)?,
            None => default_root(runtime)?,
        };
        let link_dir = match link_dir {
            Some(path) => absolute(runtime, path)?,
            None => default_link_dir(runtime, &root),
        };
        debug!("Using root {:?}, link dir {:?}", root, link_dir);

        Ok(Self {
            packages_root: root.join(PACKAGES_DIR),
            root,
            link_dir,
        })
    }

    /// Global link location for the command `name`.
    pub fn link_path(&self, name: &str) -> PathBuf {
        self.link_dir.join(command_file_name(name))
    }
}

#[tracing::instrument(skip(runtime))]
pub fn default_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(".grove"))
}

/// Anchor a relative path at the working directory so symlinks written
/// between `root` and `link_dir` resolve from anywhere.
fn absolute<R: Runtime>(runtime: &R, path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(normalize_path(&runtime.current_dir()?.join(path)))
}

fn default_link_dir<R: Runtime>(runtime: &R, root: &Path) -> PathBuf {
    if runtime.is_privileged() {
        system_link_dir()
    } else {
        root.join("bin")
    }
}

#[cfg(target_os = "windows")]
fn system_link_dir() -> PathBuf {
    PathBuf::from(r"C:\ProgramData\grove\bin")
}

#[cfg(not(target_os = "windows"))]
fn system_link_dir() -> PathBuf {
    PathBuf::from("/usr/local/bin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_home;

    #[test]
    fn test_defaults_for_regular_user() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().returning(|| Some(test_home()));
        runtime.expect_is_privileged().returning(|| false);

        let config = Config::new(&runtime, None, None).unwrap();
        assert_eq!(config.root, test_home().join(".grove"));
        assert_eq!(config.packages_root, test_home().join(".grove").join("packages"));
        assert_eq!(config.link_dir, test_home().join(".grove").join("bin"));
    }

    #[test]
    fn test_privileged_links_into_system_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().returning(|| Some(test_home()));
        runtime.expect_is_privileged().returning(|| true);

        let config = Config::new(&runtime, None, None).unwrap();
        assert_eq!(config.link_dir, system_link_dir());
    }

    #[test]
    fn test_explicit_paths_win() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().never();
        runtime.expect_is_privileged().never();

        runtime.expect_current_dir().never();

        let config = Config::new(
            &runtime,
            Some(test_home().join("grove")),
            Some(test_home().join("bin")),
        )
        .unwrap();
        assert_eq!(config.packages_root, test_home().join("grove").join("packages"));
        assert_eq!(config.link_dir, test_home().join("bin"));
        assert_eq!(
            config.link_path("tool"),
            test_home().join("bin").join(command_file_name("tool"))
        );
    }

    #[test]
    fn test_relative_paths_are_anchored_at_working_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_current_dir().returning(|| Ok(test_home()));
        runtime.expect_is_privileged().returning(|| true);

        let config = Config::new(&runtime, Some(PathBuf::from("./state/../grove")), None).unwrap();
        assert_eq!(config.root, test_home().join("grove"));
        assert_eq!(config.packages_root, test_home().join("grove").join("packages"));
        assert_eq!(config.link_dir, system_link_dir());

        let config = Config::new(
            &runtime,
            Some(PathBuf::from("grove")),
            Some(PathBuf::from("bin")),
        )
        .unwrap();
        assert_eq!(config.link_dir, test_home().join("bin"));
    }

    #[test]
    fn test_missing_home_dir_is_an_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().returning(|| None);

        let err = Config::new(&runtime, None, None).unwrap_err();
        assert!(err.to_string().contains("home directory"));
    }
}
