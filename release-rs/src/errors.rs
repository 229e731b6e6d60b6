//! Error types for the release pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Ontology error: {0}")]
    Ontology(String),

    #[error("Documentation generator error: {0}")]
    Generator(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl From<crate::ontology::OntologyError> for ReleaseError {
    fn from(err: crate::ontology::OntologyError) -> Self {
        ReleaseError::Ontology(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReleaseError>;
