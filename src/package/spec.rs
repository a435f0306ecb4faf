//! Package identity: repository locator, version and command name.

use anyhow::{Result, anyhow, bail};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::GroveError;

const DEFAULT_HOST: &str = "https://github.com";

/// One installable tool: where its source lives, which ref to build and the
/// name of the command it produces.
///
/// `version` may be empty until it is resolved from the repository's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub repository: String,
    pub version: String,
    pub name: String,
}

impl Package {
    /// Create a package, deriving the command name from the locator when not given.
    pub fn new(
        repository: impl Into<String>,
        version: impl Into<String>,
        name: Option<String>,
    ) -> Self {
        let repository = expand_locator(&repository.into());
        let name = name.unwrap_or_else(|| default_name(&repository));
        Self {
            repository,
            version: version.into(),
            name,
        }
    }

    /// Fail with [`GroveError::InvalidRepository`] unless the locator carries an
    /// owner/name separator, and reject an empty command name.
    pub fn validate(&self) -> Result<()> {
        let trimmed = self.repository.trim_end_matches('/');
        if !trimmed.contains('/') {
            return Err(GroveError::InvalidRepository {
                locator: self.repository.clone(),
            }
            .into());
        }
        if self.name.is_empty() {
            bail!(
                "no command name for '{}'; pass one with --command",
                self.repository
            );
        }
        Ok(())
    }

    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.repository)
        } else {
            write!(f, "{}@{}", self.repository, self.version)
        }
    }
}

impl FromStr for Package {
    type Err = anyhow::Error;

    /// Parse `<locator>[@<version>]`. Only an `@` after the last `/` separates
    /// a version, so `git@host:owner/repo` keeps its user part.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let last_slash = s.rfind('/').unwrap_or(0);
        let (locator, version) = match s.rfind('@') {
            Some(at_pos) if at_pos > last_slash => {
                let (locator, ver) = s.split_at(at_pos);
                let ver = &ver[1..];
                if ver.is_empty() {
                    return Err(anyhow!(
                        "Invalid format: version after @ cannot be empty. Expected 'owner/repo@version'."
                    ));
                }
                (locator, ver)
            }
            _ => (s, ""),
        };

        if locator.is_empty() {
            return Err(GroveError::InvalidRepository {
                locator: s.to_string(),
            }
            .into());
        }

        let package = Package::new(locator, version, None);
        package.validate()?;
        Ok(package)
    }
}

/// Turn the `owner/repo` shorthand into a full git URL. URLs, scp-style
/// locators and filesystem paths are kept as given.
pub fn expand_locator(locator: &str) -> String {
    let locator = locator.trim();
    if locator.contains("://")
        || locator.contains('@')
        || locator.contains(':')
        || locator.starts_with('/')
        || locator.starts_with('.')
        || locator.starts_with('~')
    {
        return locator.to_string();
    }

    let parts: Vec<&str> = locator.split('/').collect();
    if parts.len() == 2 && parts.iter().all(|p| !p.is_empty()) {
        let repo = parts[1].strip_suffix(".git").unwrap_or(parts[1]);
        format!("{}/{}/{}.git", DEFAULT_HOST, parts[0], repo)
    } else {
        locator.to_string()
    }
}

/// Last path segment of the locator without its extension.
pub fn default_name(locator: &str) -> String {
    let trimmed = locator.trim_end_matches('/');
    let segment = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    Path::new(segment)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(segment)
        .to_string()
}
