//! Package management module
//!
//! This module provides the package identity model, its on-disk layout,
//! version resolution from tags and the metadata store of installed packages.

mod meta;
mod path;
mod spec;
mod version;

pub use meta::{LOCK_FILE, METADATA_FILE, Metadata, MetadataStore};
pub use path::{
    BUILD_DIR, CHECKOUT_DIR, PackagePath, command_file_name, local_dir_name, package_dir,
    version_dir_name,
};
pub use spec::{Package, default_name, expand_locator};
pub use version::{DEFAULT_BRANCH, Resolution, Version, VersionResolver};
