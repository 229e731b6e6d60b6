//! Primary ontology selection
//!
//! Without an explicit file name the shortest candidate name wins, on the
//! assumption that companions such as `<name>_individuals.ttl` always extend
//! the primary name. Ties break by file name. This is a heuristic: a
//! directory holding two unrelated ontologies of different name lengths will
//! silently pick the shorter one, so set `primaryOntology` in that case.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::graph::format_for_path;
use super::OntologyError;

/// Suffix of the example-individuals companion file stem
pub const INDIVIDUALS_SUFFIX: &str = "_individuals";

/// Suffix of the diagram companion file
pub const DIAGRAM_SUFFIX: &str = "_diagram.svg";

/// The primary ontology file and its optional companions
#[derive(Debug, Clone, PartialEq)]
pub struct OntologyFiles {
    pub primary: PathBuf,
    /// File stem of the primary file, used as namespace prefix
    pub short_name: String,
    pub individuals: Option<PathBuf>,
    pub diagram: Option<PathBuf>,
}

impl OntologyFiles {
    /// File name of the diagram, whether or not it exists
    pub fn diagram_file_name(&self) -> String {
        format!("{}{}", self.short_name, DIAGRAM_SUFFIX)
    }
}

pub struct OntologyLocator {
    ontology_dir: PathBuf,
    primary_override: Option<String>,
}

impl OntologyLocator {
    pub fn new<P: Into<PathBuf>>(ontology_dir: P, primary_override: Option<String>) -> Self {
        Self {
            ontology_dir: ontology_dir.into(),
            primary_override,
        }
    }

    /// RDF files directly inside the ontology directory, sorted by file name
    pub fn candidates(&self) -> Result<Vec<PathBuf>, OntologyError> {
        if !self.ontology_dir.is_dir() {
            return Err(OntologyError::NotFound(format!(
                "Ontology directory missing: {}",
                self.ontology_dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.ontology_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| OntologyError::LoadError(e.to_string()))?;
            if entry.file_type().is_file() && format_for_path(entry.path()).is_some() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Select the primary ontology and resolve its companions
    pub fn locate(&self) -> Result<OntologyFiles, OntologyError> {
        let primary = match &self.primary_override {
            Some(name) => {
                let path = self.ontology_dir.join(name);
                if !path.is_file() {
                    return Err(OntologyError::NotFound(format!(
                        "Configured primary ontology missing: {}",
                        path.display()
                    )));
                }
                path
            }
            None => {
                let candidates = self.candidates()?;
                shortest_name(&candidates).ok_or_else(|| {
                    OntologyError::NotFound(format!(
                        "No ontology file (*.ttl, *.nt, *.rdf, *.owl) in {}",
                        self.ontology_dir.display()
                    ))
                })?
            }
        };

        let short_name = primary
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| OntologyError::LoadError(format!("No file stem: {}", primary.display())))?;

        let individuals = self.companion_individuals(&short_name)?;
        let diagram = Some(self.ontology_dir.join(format!("{}{}", short_name, DIAGRAM_SUFFIX)))
            .filter(|p| p.is_file());

        tracing::debug!(
            primary = %primary.display(),
            individuals = ?individuals,
            diagram = ?diagram,
            "Located ontology files"
        );

        Ok(OntologyFiles {
            primary,
            short_name,
            individuals,
            diagram,
        })
    }

    fn companion_individuals(&self, short_name: &str) -> Result<Option<PathBuf>, OntologyError> {
        if !self.ontology_dir.is_dir() {
            return Ok(None);
        }
        let wanted = format!("{}{}", short_name, INDIVIDUALS_SUFFIX);
        Ok(self
            .candidates()?
            .into_iter()
            .find(|p| p.file_stem().map(|s| s.to_string_lossy() == wanted).unwrap_or(false)))
    }
}

/// Shortest file name, first in the (sorted) input on ties
fn shortest_name(paths: &[PathBuf]) -> Option<PathBuf> {
    paths
        .iter()
        .min_by_key(|p| file_name_len(p))
        .cloned()
}

fn file_name_len(path: &Path) -> usize {
    path.file_name().map(|n| n.to_string_lossy().chars().count()).unwrap_or(usize::MAX)
}
