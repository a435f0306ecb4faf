//! Persistent mapping from repository locator to local package directory.
//!
//! The whole document is read, changed in memory and written back; writes go
//! through a temp file and a rename. Read-modify-write cycles hold an
//! exclusive lock on `metadata.lock` so concurrent `grove` processes don't
//! drop each other's updates.

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::GroveError;
use crate::runtime::Runtime;

pub const METADATA_FILE: &str = "metadata.json";
pub const LOCK_FILE: &str = "metadata.lock";

/// The persisted document: `{"packages": {"<locator>": "<dir_name>"}}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    #[serde(default)]
    pub packages: BTreeMap<String, String>,
}

impl Metadata {
    /// Locators whose text contains `fragment`, ignoring case, in key order.
    pub fn matching(&self, fragment: &str) -> Vec<String> {
        let needle = fragment.to_lowercase();
        self.packages
            .keys()
            .filter(|locator| locator.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

pub struct MetadataStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
    lock_path: PathBuf,
}

impl<'a, R: Runtime> MetadataStore<'a, R> {
    /// Store backed by `<root>/metadata.json`.
    pub fn new(runtime: &'a R, root: &Path) -> Self {
        Self {
            runtime,
            path: root.join(METADATA_FILE),
            lock_path: root.join(LOCK_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file is an empty document.
    #[tracing::instrument(skip(self))]
    pub fn read(&self) -> Result<Metadata> {
        if !self.runtime.exists(&self.path) {
            debug!("No metadata at {:?}, starting empty", self.path);
            return Ok(Metadata::default());
        }

        let content = self
            .runtime
            .read_to_string(&self.path)
            .map_err(|e| GroveError::io(&self.path, e))?;
        let metadata = serde_json::from_str(&content).map_err(|source| {
            GroveError::CorruptMetadata {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(metadata)
    }

    /// Replace the document on disk.
    #[tracing::instrument(skip(self, metadata))]
    pub fn write(&self, metadata: &Metadata) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata)?;
        let tmp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime
                .create_dir_all(parent)
                .map_err(|e| GroveError::io(parent, e))?;
        }

        self.runtime
            .write(&tmp_path, json.as_bytes())
            .map_err(|e| GroveError::io(&tmp_path, e))?;
        self.runtime
            .rename(&tmp_path, &self.path)
            .map_err(|e| GroveError::io(&self.path, e))?;
        Ok(())
    }

    /// Set `repository -> dir_name`, overwriting any previous entry.
    #[tracing::instrument(skip(self))]
    pub fn record_package(&self, repository: &str, dir_name: &str) -> Result<()> {
        let _lock = self.lock()?;
        let mut metadata = self.read()?;
        if metadata.packages.get(repository).map(String::as_str) == Some(dir_name) {
            debug!("{} already recorded", repository);
            return Ok(());
        }
        metadata
            .packages
            .insert(repository.to_string(), dir_name.to_string());
        self.write(&metadata)
    }

    /// Drop the entry for `repository`. Returns whether it existed.
    #[tracing::instrument(skip(self))]
    pub fn remove_package(&self, repository: &str) -> Result<bool> {
        let _lock = self.lock()?;
        let mut metadata = self.read()?;
        if metadata.packages.remove(repository).is_none() {
            return Ok(false);
        }
        self.write(&metadata)?;
        Ok(true)
    }

    /// First locator containing `fragment` (case-insensitive).
    ///
    /// Several locators may match; callers that act on the result destructively
    /// should use [`Self::resolve_repository`] instead.
    pub fn find_repository(&self, fragment: &str) -> Result<Option<String>> {
        Ok(self.read()?.matching(fragment).into_iter().next())
    }

    /// Every locator containing `fragment` (case-insensitive).
    pub fn find_repositories(&self, fragment: &str) -> Result<Vec<String>> {
        Ok(self.read()?.matching(fragment))
    }

    /// The one locator `fragment` refers to: an exact key, or the single
    /// substring match. Fails with `PackageNotFound` or `AmbiguousPackage`.
    pub fn resolve_repository(&self, fragment: &str) -> Result<String> {
        let metadata = self.read()?;
        if metadata.packages.contains_key(fragment) {
            return Ok(fragment.to_string());
        }

        let mut candidates = metadata.matching(fragment);
        match candidates.len() {
            0 => Err(GroveError::PackageNotFound {
                fragment: fragment.to_string(),
            }
            .into()),
            1 => Ok(candidates.remove(0)),
            _ => Err(GroveError::AmbiguousPackage {
                fragment: fragment.to_string(),
                candidates,
            }
            .into()),
        }
    }

    fn lock(&self) -> Result<crate::runtime::FileLock> {
        self.runtime
            .lock_exclusive(&self.lock_path)
            .map_err(|e| GroveError::io(&self.lock_path, e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{FileLock, MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    const TOOL: &str = "https://github.com/owner/tool.git";
    const OTHER: &str = "https://github.com/other/Toolbox.git";

    #[test]
    fn test_read_missing_is_empty() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/grove/metadata.json")))
            .returning(|_| false);

        let store = MetadataStore::new(&runtime, Path::new("/grove"));
        assert_eq!(store.read().unwrap(), Metadata::default());
    }

    #[test]
    fn test_read_corrupt_document() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"packages": 5}"#.into()));

        let store = MetadataStore::new(&runtime, Path::new("/grove"));
        let err = store.read().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GroveError>(),
            Some(GroveError::CorruptMetadata { .. })
        ));
    }

    #[test]
    fn test_write_goes_through_temp_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("/grove/metadata.json.tmp")
                    && std::str::from_utf8(contents).unwrap().contains(TOOL)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .with(
                eq(PathBuf::from("/grove/metadata.json.tmp")),
                eq(PathBuf::from("/grove/metadata.json")),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let store = MetadataStore::new(&runtime, Path::new("/grove"));
        let mut metadata = Metadata::default();
        metadata
            .packages
            .insert(TOOL.into(), "github.com_owner_tool".into());
        store.write(&metadata).unwrap();
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("No space left on device")));

        let store = MetadataStore::new(&runtime, Path::new("/grove"));
        let err = store.write(&Metadata::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GroveError>(),
            Some(GroveError::Io { .. })
        ));
    }

    #[test]
    fn test_record_same_mapping_does_not_write() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_lock_exclusive()
            .with(eq(PathBuf::from("/grove/metadata.lock")))
            .times(1)
            .returning(|_| Ok(FileLock::unlocked()));
        runtime.expect_exists().returning(|_| true);
        runtime.expect_read_to_string().returning(|_| {
            Ok(format!(
                r#"{{"packages": {{"{}": "github.com_owner_tool"}}}}"#,
                TOOL
            ))
        });
        runtime.expect_write().never();

        let store = MetadataStore::new(&runtime, Path::new("/grove"));
        store.record_package(TOOL, "github.com_owner_tool").unwrap();
    }

    #[test]
    fn test_write_read_round_trip_is_byte_identical() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(&runtime, dir.path());

        store.record_package(TOOL, "github.com_owner_tool").unwrap();
        store.record_package(OTHER, "github.com_other_Toolbox").unwrap();
        let before = std::fs::read(store.path()).unwrap();

        store.write(&store.read().unwrap()).unwrap();
        let after = std::fs::read(store.path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_record_then_find_by_substring() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(&runtime, dir.path());

        store.record_package(TOOL, "github.com_owner_tool").unwrap();
        assert_eq!(store.find_repository("OWNER/to").unwrap(), Some(TOOL.into()));
        assert_eq!(store.find_repository("missing").unwrap(), None);
    }

    #[test]
    fn test_concurrent_records_all_survive() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        std::thread::scope(|scope| {
            for i in 0..16 {
                scope.spawn(move || {
                    MetadataStore::new(&RealRuntime, root)
                        .record_package(
                            &format!("https://github.com/owner/tool{}.git", i),
                            &format!("github.com_owner_tool{}", i),
                        )
                        .unwrap();
                });
            }
        });

        let metadata = MetadataStore::new(&RealRuntime, root).read().unwrap();
        assert_eq!(metadata.packages.len(), 16);
        for i in 0..16 {
            assert_eq!(
                metadata.packages[&format!("https://github.com/owner/tool{}.git", i)],
                format!("github.com_owner_tool{}", i)
            );
        }
    }

    #[test]
    fn test_record_overwrites_entry() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(&runtime, dir.path());

        store.record_package(TOOL, "old").unwrap();
        store.record_package(TOOL, "github.com_owner_tool").unwrap();
        let metadata = store.read().unwrap();
        assert_eq!(metadata.packages.len(), 1);
        assert_eq!(metadata.packages[TOOL], "github.com_owner_tool");
    }

    #[test]
    fn test_resolve_repository_disambiguation() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(&runtime, dir.path());
        store.record_package(TOOL, "github.com_owner_tool").unwrap();
        store.record_package(OTHER, "github.com_other_Toolbox").unwrap();

        // both contain "tool"
        let err = store.resolve_repository("tool").unwrap_err();
        match err.downcast_ref::<GroveError>() {
            Some(GroveError::AmbiguousPackage { candidates, .. }) => {
                assert_eq!(candidates, &vec![OTHER.to_string(), TOOL.to_string()]);
            }
            other => panic!("expected AmbiguousPackage, got {:?}", other),
        }

        assert_eq!(store.resolve_repository("owner/tool").unwrap(), TOOL);
        assert_eq!(store.resolve_repository(TOOL).unwrap(), TOOL);
        assert_eq!(store.find_repositories("TOOL").unwrap().len(), 2);

        let err = store.resolve_repository("nothing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GroveError>(),
            Some(GroveError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_package() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(&runtime, dir.path());
        store.record_package(TOOL, "github.com_owner_tool").unwrap();

        assert!(store.remove_package(TOOL).unwrap());
        assert!(!store.remove_package(TOOL).unwrap());
        assert!(store.read().unwrap().packages.is_empty());
    }

    #[test]
    fn test_document_format() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(&runtime, dir.path());
        store.record_package(TOOL, "github.com_owner_tool").unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "packages": { TOOL: "github.com_owner_tool" } })
        );
    }
}
