//! Version resolution from a repository's tag list.
//!
//! Tags are compared as dotted numeric versions (`1.2.10 > 1.2.9`). Tags that
//! don't parse are ignored; if nothing parses the default branch is used.

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Ref used when a repository has no usable version tags.
pub const DEFAULT_BRANCH: &str = "master";

/// A tag parsed as a dotted numeric version with an optional pre-release suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    numbers: Vec<u64>,
    pre: Option<String>,
    raw: String,
}

impl Version {
    /// Parse `1.2.3`, `v1.2`, `1.0.0-rc.1` or `2.0+build.5`. Returns `None` for
    /// anything whose core isn't all-numeric dot-separated components.
    pub fn parse(tag: &str) -> Option<Self> {
        let trimmed = tag.trim();
        let unprefixed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let without_build = unprefixed.split('+').next().unwrap_or(unprefixed);
        let (core, pre) = match without_build.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => return None,
            None => (without_build, None),
        };

        let numbers = core
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    part.parse::<u64>().ok()
                }
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            numbers,
            pre,
            raw: trimmed.to_string(),
        })
    }

    /// The tag exactly as it appeared in the repository.
    pub fn tag(&self) -> &str {
        &self.raw
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.numbers.len().max(other.numbers.len());
        let numbers = (0..len)
            .map(|i| {
                let a = self.numbers.get(i).copied().unwrap_or(0);
                let b = other.numbers.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal);

        numbers
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                // A release sorts above its pre-releases
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
            // Spelling variants of one version (`1.2` vs `v1.2.0`) still get a
            // fixed order, so the pick never depends on input order.
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of resolving the version to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Every tag name found, in listing order, for reporting.
    pub tags: Vec<String>,
    /// The ref to check out.
    pub version: String,
    /// True when no tag parsed and the default branch was chosen.
    pub fell_back: bool,
}

/// Version resolver - pure functions over tag listings.
pub struct VersionResolver;

impl VersionResolver {
    /// Resolve from raw `git ls-remote --tags` output.
    pub fn resolve(ls_remote_output: &str) -> Resolution {
        let tags = Self::parse_tags(ls_remote_output);
        let version = Self::latest(&tags);
        let fell_back = version.is_none();
        Resolution {
            version: version.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            tags,
            fell_back,
        }
    }

    /// Extract tag names from lines of `<sha>\t<refs/tags/name>`.
    ///
    /// Peeled entries (`refs/tags/name^{}`) are folded into their tag.
    pub fn parse_tags(ls_remote_output: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        ls_remote_output
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                let tag_path = line.rsplit('\t').next()?.trim();
                let tag_path = tag_path.strip_suffix("^{}").unwrap_or(tag_path);
                let name = tag_path.strip_prefix("refs/tags/").unwrap_or(tag_path);
                let name = name.rsplit('/').next().unwrap_or(name);
                if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                }
            })
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// Greatest parseable version among `tags`, or `None` if none parse.
    pub fn latest(tags: &[String]) -> Option<String> {
        tags.iter()
            .filter_map(|t| Version::parse(t))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .next_back()
            .map(|v| v.raw)
    }

    /// Order installed version names for display: parseable versions ascending,
    /// then everything else (branches, SHAs) alphabetically.
    pub fn sort_versions(versions: &mut [String]) {
        versions.sort_by(|a, b| match (Version::parse(a), Version::parse(b)) {
            (Some(va), Some(vb)) => va.cmp(&vb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        });
    }
}
