use anyhow::{Result, bail};
use log::debug;
use std::path::Path;

use crate::runtime::{ProcessCommand, Runtime};

use super::VersionControl;

/// [`VersionControl`] backed by the `git` executable.
pub struct GitSource<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> GitSource<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    fn git() -> ProcessCommand {
        // Never block on a credential prompt; a private repo we can't read is
        // reported as not found.
        ProcessCommand::new("git").env("GIT_TERMINAL_PROMPT", "0")
    }
}

impl<R: Runtime> VersionControl for GitSource<'_, R> {
    #[tracing::instrument(skip(self))]
    fn list_tags(&self, repository: &str) -> Result<String> {
        let command = Self::git().args(["ls-remote", "--tags", "--refs", repository]);
        let output = self.runtime.run_command(&command)?;
        if !output.success() {
            bail!("{}: {}", command, output.diagnostic());
        }
        debug!("{} tag lines for {}", output.stdout.lines().count(), repository);
        Ok(output.stdout)
    }

    #[tracing::instrument(skip(self))]
    fn clone_ref(&self, repository: &str, reference: &str, destination: &Path) -> Result<()> {
        let command = Self::git()
            .args(["-c", "advice.detachedHead=false", "clone"])
            .args(["--depth", "1", "--single-branch", "--quiet"])
            .args(["--branch", reference])
            .arg(repository)
            .arg(destination.to_string_lossy());
        let output = self.runtime.run_command(&command)?;
        if !output.success() {
            bail!("{}: {}", command, output.diagnostic());
        }
        Ok(())
    }
}
