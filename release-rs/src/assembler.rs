//! Output assembly
//!
//! After the generator has run, the per-version folder receives the diagram,
//! the static index page and everything staged earlier in the run (IRI
//! tables, competency answers). The latest version is then mirrored into the
//! output root so `out/` always shows the newest release. The mirror is
//! cleared first: everything in the output root except the version folders
//! is removed, so files only an older release had do not linger.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::{ReleaseError, Result};

pub struct ArtifactAssembler {
    output_root: PathBuf,
}

impl ArtifactAssembler {
    pub fn new<P: Into<PathBuf>>(output_root: P) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// `out/<version>`, created if missing
    pub fn version_dir(&self, version: &str) -> Result<PathBuf> {
        let dir = self.output_root.join(version);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Copy optional single files into `dest`, skipping the ones that do not exist
    ///
    /// Returns the file names copied.
    pub fn copy_optional(&self, files: &[&Path], dest: &Path) -> Result<Vec<String>> {
        let mut copied = Vec::new();
        for file in files {
            if !file.is_file() {
                tracing::debug!(file = %file.display(), "Optional artifact absent");
                continue;
            }
            let name = file
                .file_name()
                .ok_or_else(|| ReleaseError::FileNotFound(file.display().to_string()))?;
            fs::copy(file, dest.join(name))?;
            copied.push(name.to_string_lossy().to_string());
        }
        Ok(copied)
    }

    /// Mirror a finished version folder into the output root
    ///
    /// Entries of the output root other than the `versions` folders are
    /// removed before copying.
    pub fn promote_latest(&self, version_dir: &Path, versions: &[&str]) -> Result<usize> {
        let removed = self.clear_mirror(versions)?;
        let count = copy_tree(version_dir, &self.output_root)?;
        tracing::info!(
            from = %version_dir.display(),
            to = %self.output_root.display(),
            files = count,
            removed,
            "Promoted latest version"
        );
        Ok(count)
    }

    /// Remove everything in the output root except the version folders
    fn clear_mirror(&self, versions: &[&str]) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.output_root)? {
            let entry = entry?;
            let path = entry.path();
            let is_dir = entry.file_type()?.is_dir();
            let name = entry.file_name();
            if is_dir && versions.iter().any(|v| name.to_str() == Some(*v)) {
                continue;
            }

            tracing::debug!(path = %path.display(), "Removing stale mirror entry");
            if is_dir {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            removed += 1;
        }
        Ok(removed)
    }
}

/// Recursively copy `source` into `dest`, overwriting existing files
///
/// Returns the number of files copied.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ReleaseError::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ReleaseError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}
