use std::fmt;
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, is_path_under};

/// What currently occupies a global install location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    /// Nothing at the path.
    Missing,
    /// A regular file, directory, or anything else that is not a symlink.
    File,
    /// A symlink pointing outside the packages root.
    Symlink(PathBuf),
    /// A symlink into the packages root; carries the installed version.
    ManagedByThisSystem(String),
}

impl InstallStatus {
    /// Classify `path` against `packages_root`.
    ///
    /// A symlink whose target cannot be read is treated like an unrelated
    /// symlink pointing at its own path.
    #[tracing::instrument(skip(runtime))]
    pub fn inspect<R: Runtime>(runtime: &R, path: &Path, packages_root: &Path) -> Self {
        if runtime.is_symlink(path) {
            match runtime.resolve_link(path) {
                Ok(target) if is_path_under(&target, packages_root) => {
                    let version = target
                        .parent()
                        .and_then(Path::file_name)
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    InstallStatus::ManagedByThisSystem(version)
                }
                Ok(target) => InstallStatus::Symlink(target),
                Err(e) => {
                    log::debug!("cannot resolve {:?}: {}", path, e);
                    InstallStatus::Symlink(path.to_path_buf())
                }
            }
        } else if runtime.exists(path) {
            InstallStatus::File
        } else {
            InstallStatus::Missing
        }
    }

    /// Replacing a missing entry or another managed version needs no prompt.
    pub fn is_safe_to_overwrite_without_asking(&self) -> bool {
        matches!(
            self,
            InstallStatus::Missing | InstallStatus::ManagedByThisSystem(_)
        )
    }

    /// Human-readable description of what would be clobbered at `path`.
    pub fn warning(&self, path: &Path) -> Option<String> {
        match self {
            InstallStatus::File => Some(format!(
                "{} already exists and was not installed by grove.",
                path.display()
            )),
            InstallStatus::Symlink(target) => Some(format!(
                "{} is a symlink to {}, which is not managed by grove.",
                path.display(),
                target.display()
            )),
            InstallStatus::Missing | InstallStatus::ManagedByThisSystem(_) => None,
        }
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStatus::Missing => write!(f, "missing"),
            InstallStatus::File => write!(f, "file"),
            InstallStatus::Symlink(target) => write!(f, "symlink to {}", target.display()),
            InstallStatus::ManagedByThisSystem(version) => write!(f, "managed ({})", version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    const ROOT: &str = "/home/user/.grove/packages";

    fn link() -> PathBuf {
        PathBuf::from("/usr/local/bin/tool")
    }

    #[test]
    fn test_inspect_missing() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_symlink().with(eq(link())).returning(|_| false);
        runtime.expect_exists().with(eq(link())).returning(|_| false);

        let status = InstallStatus::inspect(&runtime, &link(), Path::new(ROOT));
        assert_eq!(status, InstallStatus::Missing);
        assert!(status.is_safe_to_overwrite_without_asking());
        assert!(status.warning(&link()).is_none());
    }

    #[test]
    fn test_inspect_plain_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_symlink().returning(|_| false);
        runtime.expect_exists().returning(|_| true);

        let status = InstallStatus::inspect(&runtime, &link(), Path::new(ROOT));
        assert_eq!(status, InstallStatus::File);
        assert!(!status.is_safe_to_overwrite_without_asking());
        let warning = status.warning(&link()).unwrap();
        assert!(warning.contains("/usr/local/bin/tool"));
    }

    #[test]
    fn test_inspect_managed_symlink_extracts_version() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_symlink().returning(|_| true);
        runtime.expect_resolve_link().returning(|_| {
            Ok(PathBuf::from(
                "/home/user/.grove/packages/github.com_owner_tool/build/1.3.0/tool",
            ))
        });

        let status = InstallStatus::inspect(&runtime, &link(), Path::new(ROOT));
        assert_eq!(status, InstallStatus::ManagedByThisSystem("1.3.0".into()));
        assert!(status.is_safe_to_overwrite_without_asking());
        assert!(status.warning(&link()).is_none());
    }

    #[test]
    fn test_inspect_foreign_symlink() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_symlink().returning(|_| true);
        runtime
            .expect_resolve_link()
            .returning(|_| Ok(PathBuf::from("/opt/homebrew/bin/tool")));

        let status = InstallStatus::inspect(&runtime, &link(), Path::new(ROOT));
        assert_eq!(
            status,
            InstallStatus::Symlink(PathBuf::from("/opt/homebrew/bin/tool"))
        );
        assert!(!status.is_safe_to_overwrite_without_asking());
        let warning = status.warning(&link()).unwrap();
        assert!(warning.contains("/opt/homebrew/bin/tool"));
    }

    #[test]
    fn test_inspect_traversal_out_of_root_is_foreign() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_symlink().returning(|_| true);
        runtime.expect_resolve_link().returning(|_| {
            Ok(PathBuf::from(
                "/home/user/.grove/packages/../../../../etc/tool",
            ))
        });

        let status = InstallStatus::inspect(&runtime, &link(), Path::new(ROOT));
        assert!(matches!(status, InstallStatus::Symlink(_)));
    }

    #[test]
    fn test_inspect_unresolvable_symlink_needs_confirmation() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_symlink().returning(|_| true);
        runtime
            .expect_resolve_link()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let status = InstallStatus::inspect(&runtime, &link(), Path::new(ROOT));
        assert!(!status.is_safe_to_overwrite_without_asking());
    }
}
