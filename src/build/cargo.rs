use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::package::command_file_name;
use crate::runtime::{ProcessCommand, Runtime};

use super::Builder;

/// [`Builder`] that runs `cargo build --release`; binaries land in
/// `<source>/target/release/`.
pub struct CargoBuilder<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> CargoBuilder<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }
}

impl<R: Runtime> Builder for CargoBuilder<'_, R> {
    #[tracing::instrument(skip(self))]
    fn build(&self, source_dir: &Path) -> Result<()> {
        let command = ProcessCommand::new("cargo")
            .args(["build", "--release", "--quiet"])
            .current_dir(source_dir);
        let output = self.runtime.run_command(&command)?;
        if !output.success() {
            bail!("{} exited with {:?}\n{}", command, output.status, output.diagnostic());
        }
        Ok(())
    }

    fn artifact_path(&self, source_dir: &Path, name: &str) -> PathBuf {
        source_dir
            .join("target")
            .join("release")
            .join(command_file_name(name))
    }
}
