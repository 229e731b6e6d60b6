//! Version metadata rewrite
//!
//! Every release rewrites a fixed set of ontology-level triples so the
//! generated documentation reflects the tag being built:
//!
//! | predicate | value |
//! | --- | --- |
//! | `dcterms:modified` | commit date, `YYYY-M-D` |
//! | `owl:versionIRI` | `<namespace>/<version>/` |
//! | `vann:preferredNamespacePrefix` | ontology short name |
//! | `vann:preferredNamespaceUri` | namespace |
//! | `owl:priorVersion` | `<namespace>/<previous version>/` (first tag: none) |
//! | `owl:versionInfo` | version |
//! | `dcterms:description` | one per language, links to diagram/tables |
//! | `dcterms:bibliographicCitation` | `<creator>: <title>. Version <version>.` |
//!
//! Existing values of these predicates are removed first, so rewriting the
//! same graph twice with the same inputs gives the same triples.

use chrono::NaiveDate;
use oxigraph::model::{Literal, NamedNode, Term};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

use super::graph::{term_language, term_text, OntologyGraph};
use super::vocab::{
    DCTERMS_CITATION, DCTERMS_CREATOR, DCTERMS_DESCRIPTION, DCTERMS_MODIFIED, DCTERMS_TITLE, DC_CREATOR, DC_TITLE,
    OWL_PRIOR_VERSION, OWL_VERSION_INFO, OWL_VERSION_IRI, REWRITTEN_PREDICATES, VANN_PREFERRED_PREFIX,
    VANN_PREFERRED_URI,
};
use super::OntologyError;
use crate::git::format_modified;
use crate::tags::VersionTag;

/// Inputs of one metadata rewrite
#[derive(Debug, Clone)]
pub struct ReleaseInfo<'a> {
    pub tag: &'a VersionTag,
    pub previous: Option<&'a VersionTag>,
    /// Commit date of the tag
    pub modified: NaiveDate,
    /// Ontology short name (primary file stem)
    pub short_name: &'a str,
    /// Diagram file referenced from the descriptions
    pub diagram_file: &'a str,
    /// Description languages
    pub languages: &'a [String],
    /// Language -> IRI table file, only for non-empty tables
    pub iri_tables: &'a BTreeMap<String, String>,
    /// Competency-question index, when that step succeeded
    pub competency_index: Option<&'a str>,
}

/// What the rewrite put on the ontology entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewrittenMetadata {
    pub version_iri: String,
    pub prior_version: Option<String>,
    pub namespace: String,
    pub modified: String,
    pub citation: Option<String>,
}

/// `<namespace without trailing separator>/<version>/`
pub fn version_iri(namespace: &str, version: &str) -> String {
    format!("{}/{}/", namespace.trim_end_matches(['/', '#']), version)
}

/// Description text for one language
pub fn description_text(lang: &str, info: &ReleaseInfo<'_>) -> String {
    let (diagram, table, questions) = match lang {
        "de" => ("Diagramm", "IRIs und Bezeichnungen", "Kompetenzfragen"),
        _ => ("Diagram", "IRIs and labels", "Competency questions"),
    };

    let mut parts = vec![format!("![{}]({})", diagram, info.diagram_file)];
    if let Some(file) = info.iri_tables.get(lang) {
        parts.push(format!("[{}]({})", table, file));
    }
    if let Some(index) = info.competency_index {
        parts.push(format!("[{}]({})", questions, index));
    }
    parts.join("\n\n")
}

/// Creator text: all creators of the first predicate that has any, sorted
fn creator_text(graph: &OntologyGraph) -> Result<Option<String>, OntologyError> {
    for predicate in [DCTERMS_CREATOR, DC_CREATOR] {
        let mut creators: Vec<String> = graph
            .ontology_values(predicate)?
            .iter()
            .filter_map(term_text)
            .filter(|s| !s.trim().is_empty())
            .collect();
        if !creators.is_empty() {
            creators.sort();
            creators.dedup();
            return Ok(Some(creators.join(", ")));
        }
    }
    Ok(None)
}

/// Title text, preferring English, then untagged, then any language
fn title_text(graph: &OntologyGraph) -> Result<Option<String>, OntologyError> {
    for predicate in [DCTERMS_TITLE, DC_TITLE] {
        let titles = graph.ontology_values(predicate)?;
        let rank = |term: &Term| match term_language(term) {
            Some(lang) if lang.eq_ignore_ascii_case("en") || lang.to_ascii_lowercase().starts_with("en-") => 0,
            None => 1,
            Some(_) => 2,
        };
        let best = titles
            .iter()
            .filter_map(|t| term_text(t).map(|text| (rank(t), text)))
            .filter(|(_, text)| !text.trim().is_empty())
            .min();
        if let Some((_, text)) = best {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

/// Rewrite the release metadata on the ontology entity
pub fn rewrite_metadata(graph: &OntologyGraph, info: &ReleaseInfo<'_>) -> Result<RewrittenMetadata, OntologyError> {
    let version = info.tag.version();
    let namespace = graph.namespace().to_string();

    // Read before clearing: citation inputs are not among the rewritten slots
    let citation = match (creator_text(graph)?, title_text(graph)?) {
        (Some(creator), Some(title)) => Some(format!("{}: {}. Version {}.", creator, title, version)),
        (creator, title) => {
            tracing::debug!(
                has_creator = creator.is_some(),
                has_title = title.is_some(),
                "No citation without both creator and title"
            );
            None
        }
    };

    for predicate in REWRITTEN_PREDICATES {
        graph.clear_ontology_values(predicate)?;
    }

    let modified = format_modified(info.modified);
    let version_iri = version_iri(&namespace, version);
    let prior_version = info.previous.map(|prev| self::version_iri(&namespace, prev.version()));

    let named = |iri: &str| NamedNode::new(iri).map_err(|e| OntologyError::ParseError(format!("{}: {}", iri, e)));

    graph.add_ontology_value(DCTERMS_MODIFIED, Literal::new_simple_literal(&modified))?;
    graph.add_ontology_value(OWL_VERSION_IRI, named(&version_iri)?)?;
    graph.add_ontology_value(VANN_PREFERRED_PREFIX, Literal::new_simple_literal(info.short_name))?;
    graph.add_ontology_value(VANN_PREFERRED_URI, Literal::new_simple_literal(&namespace))?;
    if let Some(prior) = &prior_version {
        graph.add_ontology_value(OWL_PRIOR_VERSION, named(prior)?)?;
    }
    graph.add_ontology_value(OWL_VERSION_INFO, Literal::new_simple_literal(version))?;

    for lang in info.languages {
        let text = description_text(lang, info);
        let literal = Literal::new_language_tagged_literal(text, lang.as_str())
            .map_err(|e| OntologyError::ParseError(format!("Invalid language tag '{}': {}", lang, e)))?;
        graph.add_ontology_value(DCTERMS_DESCRIPTION, literal)?;
    }

    if let Some(citation) = &citation {
        graph.add_ontology_value(DCTERMS_CITATION, Literal::new_simple_literal(citation))?;
    }

    tracing::info!(
        tag = %info.tag,
        version_iri = %version_iri,
        prior_version = ?prior_version,
        modified = %modified,
        "Rewrote ontology metadata"
    );

    Ok(RewrittenMetadata {
        version_iri,
        prior_version,
        namespace,
        modified,
        citation,
    })
}

/// Serialize the graph to a temporary Turtle file, removed when dropped
pub fn write_release_file(graph: &OntologyGraph, short_name: &str) -> Result<NamedTempFile, OntologyError> {
    let turtle = graph.to_turtle(short_name)?;

    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}-", short_name))
        .suffix(".ttl")
        .tempfile()?;
    file.write_all(&turtle)?;
    file.flush()?;

    tracing::debug!(path = %file.path().display(), bytes = turtle.len(), "Wrote rewritten ontology");
    Ok(file)
}
