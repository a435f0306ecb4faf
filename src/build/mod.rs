//! Build toolchain abstraction.

mod cargo;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use cargo::CargoBuilder;

/// Builds a checked-out source tree.
#[cfg_attr(test, mockall::automock)]
pub trait Builder {
    /// Build `source_dir` in release mode. The error carries the toolchain's
    /// diagnostic output.
    fn build(&self, source_dir: &Path) -> Result<()>;

    /// Where a successful build leaves the executable called `name`.
    fn artifact_path(&self, source_dir: &Path, name: &str) -> PathBuf;
}
