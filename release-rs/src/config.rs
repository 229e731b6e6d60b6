/**
 * config.rs
 * Parser for onto-release.yaml pipeline configuration
 *
 * Format (every key optional):
 * ```yaml
 * repository: .
 * ontologyDir: ontology
 * primaryOntology: gerps-datafield.ttl
 * outputDir: out
 * tagPrefix: v
 * languages: [de, en]
 * competencyQuestions: competency_questions.yaml
 * staticIndex: index.html
 * generator:
 *   program: java
 *   args: ["-jar", "/opt/widoco/widoco.jar"]
 *   failOnError: false
 * ```
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ReleaseError, Result};

/// File name looked up in the repository root when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "onto-release.yaml";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Git repository holding the version tags
    pub repository: PathBuf,
    /// Ontology directory, relative to the root of each tag
    pub ontology_dir: PathBuf,
    /// Explicit primary ontology file name (overrides the shortest-name heuristic)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_ontology: Option<String>,
    /// Output root; each tag lands in `<outputDir>/<version>`
    pub output_dir: PathBuf,
    /// Only tags starting with this prefix are released
    pub tag_prefix: String,
    /// Description and IRI-table languages
    pub languages: Vec<String>,
    /// Competency-question file, relative to the root of each tag
    pub competency_questions: PathBuf,
    /// Static index page, relative to the root of each tag
    pub static_index: PathBuf,
    pub generator: GeneratorConfig,
}

/// External documentation generator invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub program: String,
    /// Arguments placed before the fixed generator flags
    pub args: Vec<String>,
    /// Abort the run when the generator exits non-zero
    pub fail_on_error: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: "java".to_string(),
            args: vec!["-jar".to_string(), "/opt/widoco/widoco.jar".to_string()],
            fail_on_error: false,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            repository: PathBuf::from("."),
            ontology_dir: PathBuf::from(crate::DEFAULT_ONTOLOGY_DIR),
            primary_ontology: None,
            output_dir: PathBuf::from(crate::DEFAULT_OUTPUT_DIR),
            tag_prefix: "v".to_string(),
            languages: vec!["de".to_string(), "en".to_string()],
            competency_questions: PathBuf::from("competency_questions.yaml"),
            static_index: PathBuf::from("index.html"),
            generator: GeneratorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    ///
    /// A relative `repository` is resolved against the directory holding the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ReleaseError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let mut config: PipelineConfig = serde_yaml::from_str(&content)
            .map_err(|e| ReleaseError::Config(format!("Invalid {} YAML: {}", path.display(), e)))?;

        if config.repository.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.repository = base.join(&config.repository);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load `onto-release.yaml` from the repository root, or defaults when absent
    pub fn load_from_repository<P: AsRef<Path>>(repository: P) -> Result<Self> {
        let repository = repository.as_ref();
        let path = repository.join(DEFAULT_CONFIG_FILE);

        if !path.exists() {
            return Ok(Self {
                repository: repository.to_path_buf(),
                ..Self::default()
            });
        }

        Self::load(&path)
    }

    /// Ensures the fields the pipeline cannot default around are usable
    pub fn validate(&self) -> Result<()> {
        if self.tag_prefix.is_empty() {
            return Err(ReleaseError::Config("tagPrefix cannot be empty".to_string()));
        }

        if self.languages.is_empty() {
            return Err(ReleaseError::Config("languages cannot be empty".to_string()));
        }

        if let Some(lang) = self.languages.iter().find(|l| l.is_empty() || l.contains(char::is_whitespace)) {
            return Err(ReleaseError::Config(format!("Invalid language code: '{}'", lang)));
        }

        if self.generator.program.is_empty() {
            return Err(ReleaseError::Config("generator.program cannot be empty".to_string()));
        }

        Ok(())
    }
}
