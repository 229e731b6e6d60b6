//! External documentation generator (WIDOCO)
//!
//! The generator is opaque: it receives the rewritten ontology and an output
//! folder and produces HTML, diagrams and a WebVOWL view. Some versions nest
//! everything under `doc/`; that folder is flattened into the output folder.

use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config::GeneratorConfig;
use crate::errors::{ReleaseError, Result};

/// Nested output folder some generator versions create
pub const NESTED_DOC_DIR: &str = "doc";

/// How a generator run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Whether a nested `doc/` folder was flattened
    pub flattened: bool,
}

pub struct DocGenerator {
    program: String,
    args: Vec<String>,
    fail_on_error: bool,
    languages: Vec<String>,
}

impl DocGenerator {
    pub fn new(config: &GeneratorConfig, languages: &[String]) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            fail_on_error: config.fail_on_error,
            languages: languages.to_vec(),
        }
    }

    /// Full argument list for one run
    pub fn arguments(&self, ontology: &Path, out_dir: &Path) -> Vec<String> {
        let ontology = ontology.to_string_lossy().to_string();
        let mut args = self.args.clone();
        args.extend([
            "-ontFile".to_string(),
            ontology.clone(),
            "-import".to_string(),
            ontology,
            "-outFolder".to_string(),
            out_dir.to_string_lossy().to_string(),
            "-rewriteAll".to_string(),
            "-getOntologyMetadata".to_string(),
            "-lang".to_string(),
            self.languages.join("-"),
            "-webVowl".to_string(),
            "-uniteSections".to_string(),
            "-noPlaceHolderText".to_string(),
        ]);
        args
    }

    /// Run the generator and wait for it
    ///
    /// Failing to start the program is an error. A non-zero exit is only an
    /// error with `failOnError`; otherwise it is logged and reported.
    pub fn generate(&self, ontology: &Path, out_dir: &Path) -> Result<GenerationOutcome> {
        fs::create_dir_all(out_dir)?;
        let args = self.arguments(ontology, out_dir);

        tracing::info!(program = %self.program, out = %out_dir.display(), "Running documentation generator");
        tracing::debug!(args = ?args, "Generator arguments");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| ReleaseError::Generator(format!("Failed to run {}: {}", self.program, e)))?;

        let exit_code = output.status.code();
        let success = output.status.success();

        if !success {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if self.fail_on_error {
                return Err(ReleaseError::Generator(format!(
                    "{} exited with {:?}: {}",
                    self.program,
                    exit_code,
                    stderr.trim()
                )));
            }
            tracing::warn!(
                program = %self.program,
                exit_code = ?exit_code,
                stderr = %stderr.trim(),
                "Documentation generator failed, continuing"
            );
        }

        let flattened = flatten_nested_doc(out_dir)?;

        Ok(GenerationOutcome {
            exit_code,
            success,
            flattened,
        })
    }
}

/// Move the contents of `<out_dir>/doc` up one level and remove it
pub fn flatten_nested_doc(out_dir: &Path) -> Result<bool> {
    let nested = out_dir.join(NESTED_DOC_DIR);
    if !nested.is_dir() {
        return Ok(false);
    }

    for entry in fs::read_dir(&nested)? {
        let entry = entry?;
        let target = out_dir.join(entry.file_name());
        move_replacing(&entry.path(), &target)?;
    }
    fs::remove_dir_all(&nested)?;

    tracing::debug!(out = %out_dir.display(), "Flattened nested doc folder");
    Ok(true)
}

fn move_replacing(source: &Path, target: &Path) -> Result<()> {
    if target.is_dir() {
        if source.is_dir() {
            for entry in fs::read_dir(source)? {
                let entry = entry?;
                move_replacing(&entry.path(), &target.join(entry.file_name()))?;
            }
            fs::remove_dir_all(source)?;
            return Ok(());
        }
        fs::remove_dir_all(target)?;
    } else if target.exists() {
        fs::remove_file(target)?;
    }
    fs::rename(source, target)?;
    Ok(())
}
