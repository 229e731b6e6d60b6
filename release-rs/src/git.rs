//! Git driver for the release pipeline
//!
//! All access to the repository goes through the `git` CLI. The driver only
//! reads: it lists tags, resolves commit dates and exports tag trees. It
//! never checks anything out, so the caller's working tree stays untouched.
//!
//! ## Usage
//!
//! ```no_run
//! use onto_release::git::GitDriver;
//!
//! let driver = GitDriver::new("/path/to/ontology-repo");
//! for tag in driver.version_tags("v")? {
//!     let date = driver.commit_date(tag.name())?;
//!     println!("{} released {}", tag, date);
//! }
//! # Ok::<(), onto_release::ReleaseError>(())
//! ```

use chrono::{DateTime, NaiveDate};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::errors::{ReleaseError, Result};
use crate::tags::{enumerate_version_tags, VersionTag};

/// Git driver bound to one repository
#[derive(Debug, Clone)]
pub struct GitDriver {
    repo_path: PathBuf,
}

impl GitDriver {
    pub fn new<P: Into<PathBuf>>(repo_path: P) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Run git with `args` in the repository, failing on non-zero exit
    fn run(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| ReleaseError::Git(format!("Failed to run git {}: {}", args[0], e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::Git(format!("git {} failed: {}", args[0], stderr.trim())));
        }

        Ok(output)
    }

    /// Check that the path is inside a git work tree or bare repository
    pub fn is_repository(&self) -> bool {
        self.run(&["rev-parse", "--git-dir"]).is_ok()
    }

    /// Get list of all tags
    pub fn list_tags(&self) -> Result<Vec<String>> {
        let output = self.run(&["tag", "-l"])?;

        let tags = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(tags)
    }

    /// Tags carrying `prefix`, in ascending natural order; the last one is the latest
    pub fn version_tags(&self, prefix: &str) -> Result<Vec<VersionTag>> {
        let tags = self.list_tags()?;
        Ok(enumerate_version_tags(tags, prefix))
    }

    /// Committer date of the commit a tag points at
    pub fn commit_date(&self, tag: &str) -> Result<NaiveDate> {
        let rev = format!("{}^{{commit}}", tag);
        let output = self.run(&["log", "-1", "--format=%cI", &rev])?;
        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();

        let date = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| ReleaseError::Git(format!("Unparseable commit date '{}' for {}: {}", raw, tag, e)))?;

        Ok(date.date_naive())
    }

    /// Tar archive of the tree a tag points at
    pub fn archive(&self, tag: &str) -> Result<Vec<u8>> {
        let output = self.run(&["archive", "--format=tar", tag])?;
        Ok(output.stdout)
    }

    /// Unpack the tree of `tag` into `dest`
    ///
    /// Paths marked `export-ignore` in the tag's `.gitattributes` are left out.
    pub fn export_tag(&self, tag: &str, dest: &Path) -> Result<()> {
        use tar::Archive;

        let bytes = self.archive(tag)?;
        let mut archive = Archive::new(bytes.as_slice());

        archive.unpack(dest).map_err(|e| {
            ReleaseError::Git(format!("Failed to unpack {} into {}: {}", tag, dest.display(), e))
        })?;

        Ok(())
    }
}

/// `YYYY-M-D` without zero padding
pub fn format_modified(date: NaiveDate) -> String {
    date.format("%Y-%-m-%-d").to_string()
}
