//! Failure taxonomy for install, lookup and metadata operations.
//!
//! Operations return `anyhow::Result`; the variants below are the errors
//! callers are expected to branch on (via `downcast_ref::<GroveError>()`).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GroveError {
    #[error("invalid repository '{locator}': expected 'owner/name' or a git URL")]
    InvalidRepository { locator: String },

    #[error("repository '{locator}' not found or not reachable")]
    RepositoryNotFound {
        locator: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no installed package matches '{fragment}'")]
    PackageNotFound { fragment: String },

    #[error(
        "'{fragment}' matches more than one package: {}",
        candidates.join(", ")
    )]
    AmbiguousPackage {
        fragment: String,
        candidates: Vec<String>,
    },

    #[error("build of '{locator}' did not produce an executable named '{name}'")]
    InvalidCommand { locator: String, name: String },

    #[error("failed to build '{locator}' at {version}")]
    BuildFailed {
        locator: String,
        version: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("metadata document {path:?} is corrupt")]
    CorruptMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O failure on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl GroveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        GroveError::Io {
            path: path.into(),
            source,
        }
    }
}
