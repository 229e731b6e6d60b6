//! # onto-release - Versioned Ontology Documentation
//!
//! Builds browsable documentation for every released version of an OWL
//! ontology kept in a git repository. Each `v<version>` tag becomes a folder
//! `out/<version>/`; the newest one is also mirrored into `out/`.
//!
//! ## Per-tag steps
//!
//! ```text
//!  git tag ──► snapshot ──► ontology graph ──┬──► IRI tables
//!                                            ├──► competency questions
//!                                            └──► metadata rewrite
//!                                                      │
//!                                                      ▼
//!                       out/<version>/ ◄── assembler ◄── WIDOCO
//! ```
//!
//! Every release rewrites the version metadata on the ontology entity
//! (`owl:versionIRI`, `owl:priorVersion`, `dcterms:modified`, ...) so the
//! generated pages describe the tag being built, not the working copy.

pub mod errors;
pub mod config;
pub mod tags;
pub mod git;
pub mod snapshot;
pub mod ontology;
pub mod competency;
pub mod docgen;
pub mod assembler;
pub mod pipeline;

pub use errors::ReleaseError;
pub use config::{GeneratorConfig, PipelineConfig};
pub use tags::{natural_cmp, VersionTag};
pub use git::GitDriver;
pub use snapshot::TagSnapshot;
pub use ontology::{OntologyError, OntologyFiles, OntologyGraph, OntologyLocator, ReleaseInfo, RewrittenMetadata};
pub use competency::{CompetencyConfig, CompetencyError, CompetencyOutcome, CompetencyQuestion, CompetencyReport};
pub use docgen::{DocGenerator, GenerationOutcome};
pub use assembler::ArtifactAssembler;
pub use pipeline::{Pipeline, RunSummary, TagReport};

/// Version of the release tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default output root
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Default ontology directory inside each tag
pub const DEFAULT_ONTOLOGY_DIR: &str = "ontology";
