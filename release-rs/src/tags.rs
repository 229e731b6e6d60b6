//! Version tags and their natural ordering
//!
//! Tags follow the `v<version>` convention (`v1.2`, `v1.10`, `v2.0.1`).
//! Digit runs compare numerically, so `v1.9 < v1.10`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::errors::{ReleaseError, Result};

/// A release tag and the version string derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionTag {
    name: String,
    version: String,
}

impl VersionTag {
    /// Parse a tag name, stripping `prefix` to obtain the version
    pub fn parse(name: &str, prefix: &str) -> Result<Self> {
        let version = name
            .strip_prefix(prefix)
            .ok_or_else(|| ReleaseError::InvalidTag(format!("'{}' does not start with '{}'", name, prefix)))?;

        if version.is_empty() {
            return Err(ReleaseError::InvalidTag(format!("'{}' has no version after the prefix", name)));
        }

        if version.contains(['/', '\\']) || version == "." || version == ".." {
            return Err(ReleaseError::InvalidTag(format!("'{}' is not usable as a directory name", name)));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// Full tag name as stored in git (`v1.2`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version without the prefix (`1.2`)
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Ord for VersionTag {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.name, &other.name)
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

static CHUNKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+|\D+").expect("chunk pattern is valid"));

/// Numeric-aware string comparison
///
/// Digit runs are compared by value (leading zeros ignored), everything else
/// lexically. Equal-valued runs such as `01` and `1` fall back to the raw text
/// so the order stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = CHUNKS.find_iter(a).map(|m| m.as_str());
    let mut right = CHUNKS.find_iter(b).map(|m| m.as_str());

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (is_digits(l), is_digits(r)) {
                    (true, true) => cmp_digit_runs(l, r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn is_digits(chunk: &str) -> bool {
    chunk.bytes().all(|b| b.is_ascii_digit())
}

fn cmp_digit_runs(l: &str, r: &str) -> Ordering {
    let l = l.trim_start_matches('0');
    let r = r.trim_start_matches('0');
    l.len().cmp(&r.len()).then_with(|| l.cmp(r))
}

/// Keep tags carrying `prefix`, in ascending natural order
///
/// Names that match the prefix but cannot be turned into a version are
/// skipped with a warning.
pub fn enumerate_version_tags<I, S>(names: I, prefix: &str) -> Vec<VersionTag>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<VersionTag> = names
        .into_iter()
        .filter(|name| name.as_ref().starts_with(prefix))
        .filter_map(|name| match VersionTag::parse(name.as_ref(), prefix) {
            Ok(tag) => Some(tag),
            Err(e) => {
                tracing::warn!(tag = name.as_ref(), error = %e, "Skipping tag");
                None
            }
        })
        .collect();

    tags.sort();
    tags.dedup();
    tags
}
