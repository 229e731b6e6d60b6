//! Per-tag working views
//!
//! Each tag is exported into its own temporary directory instead of checking
//! tags out one after another in a shared working copy. The directory is
//! removed when the snapshot is dropped.
//!
//! The export is made with `git archive`, which honours the tag's
//! `.gitattributes`: paths marked `export-ignore` are not in the snapshot,
//! and `export-subst` placeholders are expanded. Keep the ontology folder,
//! the competency file and the static index out of `export-ignore`.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::errors::Result;
use crate::git::GitDriver;
use crate::tags::VersionTag;

/// Read-only export of one tag's tree
#[derive(Debug)]
pub struct TagSnapshot {
    dir: TempDir,
}

impl TagSnapshot {
    /// Export `tag` from the repository into a fresh temporary directory
    pub fn export(git: &GitDriver, tag: &VersionTag) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("onto-release-{}-", tag.version()))
            .tempdir()?;

        git.export_tag(tag.name(), dir.path())?;

        tracing::debug!(tag = %tag, path = %dir.path().display(), "Exported tag snapshot");

        Ok(Self { dir })
    }

    /// Root of the exported tree
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Resolve a path relative to the snapshot root
    pub fn join<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.dir.path().join(relative)
    }
}
