//! Source control abstraction.
//!
//! The installer only needs two things from a repository host: the list of
//! tags, and a shallow checkout of one ref.

mod git;

use anyhow::Result;
use std::path::Path;

pub use git::GitSource;

/// Fetches sources for a repository locator.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl {
    /// Raw tag listing, one `<sha>\t<refs/tags/name>` line per tag.
    fn list_tags(&self, repository: &str) -> Result<String>;

    /// Shallow, single-branch checkout of `reference` into `destination`.
    fn clone_ref(&self, repository: &str, reference: &str, destination: &Path) -> Result<()>;
}
