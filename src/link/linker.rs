use anyhow::Result;
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, is_path_under, relative_symlink_path};

use super::InstallStatus;

/// How a global link request ended. None of these are errors: the package
/// itself is already installed by the time linking runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    Replaced { previous_version: String },
    /// The user refused to overwrite something grove does not own.
    Declined,
    Failed(String),
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOutcome::Linked => write!(f, "linked"),
            LinkOutcome::Replaced { previous_version } => {
                write!(f, "replaced version {}", previous_version)
            }
            LinkOutcome::Declined => write!(f, "declined"),
            LinkOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Places and removes the shared symlinks that expose installed commands.
pub struct GlobalLinker<'a, R: Runtime> {
    runtime: &'a R,
    packages_root: PathBuf,
}

impl<'a, R: Runtime> GlobalLinker<'a, R> {
    pub fn new(runtime: &'a R, packages_root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            packages_root: packages_root.into(),
        }
    }

    pub fn inspect(&self, target: &Path) -> InstallStatus {
        InstallStatus::inspect(self.runtime, target, &self.packages_root)
    }

    /// Point `target` at `source`, asking first if `target` holds something
    /// grove did not put there.
    #[tracing::instrument(skip(self))]
    pub fn link_globally(&self, source: &Path, target: &Path) -> LinkOutcome {
        let status = self.inspect(target);
        debug!("{:?} is {}", target, status);

        if let Some(warning) = status.warning(target)
            && !status.is_safe_to_overwrite_without_asking()
        {
            match self.runtime.confirm(&format!("{} Overwrite it?", warning)) {
                Ok(true) => {}
                Ok(false) => return LinkOutcome::Declined,
                Err(e) => return LinkOutcome::Failed(format!("{:#}", e)),
            }
        }

        if status != InstallStatus::Missing {
            self.remove_existing(target);
        }
        if let Some(parent) = target.parent()
            && let Err(e) = self.runtime.create_dir_all(parent)
        {
            debug!("cannot create {:?}: {}", parent, e);
        }

        if let Err(e) = self.create_link(source, target) {
            return LinkOutcome::Failed(format!("{:#}", e));
        }
        info!("linked {:?} -> {:?}", target, source);

        match status {
            InstallStatus::ManagedByThisSystem(previous_version) => {
                LinkOutcome::Replaced { previous_version }
            }
            _ => LinkOutcome::Linked,
        }
    }

    /// Symlinks directly inside `link_dir` that resolve under `prefix`, with
    /// their resolved targets.
    pub fn managed_links(&self, link_dir: &Path, prefix: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
        if !self.runtime.is_dir(link_dir) {
            return Ok(Vec::new());
        }

        let mut links = Vec::new();
        for entry in self.runtime.read_dir(link_dir)? {
            if !self.runtime.is_symlink(&entry) {
                continue;
            }
            if let Ok(target) = self.runtime.resolve_link(&entry)
                && is_path_under(&target, prefix)
            {
                links.push((entry, target));
            }
        }
        links.sort();
        Ok(links)
    }

    pub fn remove_link(&self, link: &Path) -> Result<()> {
        self.runtime.remove_symlink(link)
    }

    fn create_link(&self, source: &Path, target: &Path) -> Result<()> {
        match relative_symlink_path(target, source) {
            Some(relative) => self.runtime.symlink(&relative, target),
            // a relative source stored verbatim would resolve against the link dir
            None if source.is_relative() => {
                let source = self.runtime.current_dir()?.join(source);
                self.runtime.symlink(&source, target)
            }
            None => self.runtime.symlink(source, target),
        }
    }

    fn remove_existing(&self, target: &Path) {
        let result = if self.runtime.is_symlink(target) {
            self.runtime.remove_symlink(target)
        } else if self.runtime.is_dir(target) {
            self.runtime.remove_dir_all(target)
        } else {
            self.runtime.remove_file(target)
        };
        if let Err(e) = result {
            debug!("cannot remove {:?}: {}", target, e);
        }
    }
}
