//! Lexical path helpers used when comparing link targets against the packages root.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root is kept as-is
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Check if `path` lies under `dir`, comparing normalized components.
///
/// `/home/user/.grove/packages/../../../etc/passwd` is NOT under
/// `/home/user/.grove/packages`, and `/opt/grove-other` is not under `/opt/grove`.
pub fn is_path_under(path: &Path, dir: &Path) -> bool {
    let normalized_path = normalize_path(path);
    let normalized_dir = normalize_path(dir);

    let path_components: Vec<_> = normalized_path.components().collect();
    let dir_components: Vec<_> = normalized_dir.components().collect();

    if path_components.len() < dir_components.len() {
        return false;
    }

    dir_components
        .iter()
        .zip(path_components.iter())
        .all(|(d, p)| d == p)
}

/// Calculate the relative path from a symlink location to its target.
///
/// A link at `/home/user/.grove/bin/tool` pointing to
/// `/home/user/.grove/packages/github.com_o_tool/build/1.0.0/tool` is stored as
/// `../packages/github.com_o_tool/build/1.0.0/tool`.
///
/// Returns `None` if no relative path exists (e.g. different drive letters on Windows).
pub fn relative_symlink_path(from_link: &Path, to_target: &Path) -> Option<PathBuf> {
    let from_dir = from_link.parent()?;
    let result = pathdiff::diff_paths(to_target, from_dir)?;

    if result.is_absolute() {
        return None;
    }

    Some(result)
}
