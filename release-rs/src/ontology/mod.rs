/**
 * ontology module
 *
 * - vocab: IRIs of the ontology metadata vocabulary (owl, dcterms, vann)
 * - locator: picks the primary ontology file and its companions
 * - graph: RDF graph of one ontology file (Oxigraph)
 * - metadata: rewrites version metadata on the ontology entity
 * - iri_table: Markdown tables of labelled IRIs per language
 */

pub mod graph;
pub mod iri_table;
pub mod locator;
pub mod metadata;
pub mod vocab;

use thiserror::Error;

pub use graph::OntologyGraph;
pub use iri_table::{iri_table, table_file_name, IriRow};
pub use locator::{OntologyFiles, OntologyLocator};
pub use metadata::{rewrite_metadata, write_release_file, ReleaseInfo, RewrittenMetadata};

#[derive(Error, Debug)]
pub enum OntologyError {
    #[error("Failed to load ontology: {0}")]
    LoadError(String),

    #[error("Failed to parse RDF: {0}")]
    ParseError(String),

    #[error("Ontology not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Serialization error: {0}")]
    SerializeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Oxigraph error: {0}")]
    StoreError(String),
}

impl From<oxigraph::store::StorageError> for OntologyError {
    fn from(err: oxigraph::store::StorageError) -> Self {
        OntologyError::StoreError(err.to_string())
    }
}
