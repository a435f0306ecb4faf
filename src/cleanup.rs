use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Removes a scratch directory when dropped, however the owning scope exits.
///
/// Removal is best effort; a failure is only logged.
pub struct ScratchDir<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> ScratchDir<'a, R> {
    /// Clear whatever a previous run left at `path` and take ownership of it.
    pub fn claim(runtime: &'a R, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scratch = Self { runtime, path };
        scratch.remove();
        scratch
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&self) {
        if !self.runtime.exists(&self.path) {
            return;
        }
        debug!("Cleaning up: {:?}", self.path);
        if let Err(e) = self.runtime.remove_dir_all(&self.path) {
            debug!("cannot remove {:?}: {}", self.path, e);
        }
    }
}

impl<R: Runtime> Drop for ScratchDir<'_, R> {
    fn drop(&mut self) {
        self.remove();
    }
}
