// Metadata Rewrite Contract Tests
//
// These tests pin the shape of the metadata written onto the ontology entity.
// Published version IRIs are referenced from outside (priorVersion links,
// w3id redirects), so changing any of these is a breaking change for readers
// of already released documentation.

use chrono::NaiveDate;
use onto_release::ontology::graph::term_text;
use onto_release::ontology::metadata::version_iri;
use onto_release::ontology::vocab::{
    DCTERMS_CITATION, DCTERMS_DESCRIPTION, DCTERMS_MODIFIED, OWL_PRIOR_VERSION, OWL_VERSION_INFO, OWL_VERSION_IRI,
    VANN_PREFERRED_PREFIX, VANN_PREFERRED_URI,
};
use onto_release::ontology::rewrite_metadata;
use onto_release::{OntologyGraph, ReleaseInfo, VersionTag};
use oxigraph::model::NamedNodeRef;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

const ONTOLOGY: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix dc: <http://purl.org/dc/elements/1.1/> .
@prefix vann: <http://purl.org/vocab/vann/> .
@prefix df: <https://w3id.org/gerps/datafield/> .

<https://w3id.org/gerps/datafield> a owl:Ontology ;
    dc:title "Datafield"@de , "Data field"@en ;
    dc:creator "GERPS" ;
    owl:versionIRI <https://w3id.org/gerps/datafield/0.9/> ;
    owl:versionInfo "0.9" ;
    vann:preferredNamespacePrefix "old" ;
    dcterms:description "Old description"@en .

df:Field a owl:Class ; rdfs:label "Field"@en .
"#;

fn load(temp_dir: &TempDir) -> OntologyGraph {
    let path = temp_dir.path().join("datafield.ttl");
    fs::write(&path, ONTOLOGY).unwrap();
    OntologyGraph::load(&path).unwrap()
}

fn sorted_triples(graph: &OntologyGraph) -> Vec<String> {
    let mut triples: Vec<String> = graph.store().iter().map(|quad| quad.unwrap().to_string()).collect();
    triples.sort();
    triples
}

/// WHY: Rebuilding a release must give the same ontology file
/// REASON: Every existing value of a rewritten predicate is removed first
/// BREAKS: Appending instead of replacing grows duplicate versionIRI triples per run
#[test]
fn rewrite_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let graph = load(&temp_dir);
    let tag = VersionTag::parse("v1.10", "v").unwrap();
    let previous = VersionTag::parse("v1.9", "v").unwrap();
    let languages = vec!["de".to_string(), "en".to_string()];
    let mut tables = BTreeMap::new();
    tables.insert("en".to_string(), "iri_table_en.md".to_string());

    let info = ReleaseInfo {
        tag: &tag,
        previous: Some(&previous),
        modified: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
        short_name: "datafield",
        diagram_file: "datafield_diagram.svg",
        languages: &languages,
        iri_tables: &tables,
        competency_index: Some("competency_questions.md"),
    };

    let first = rewrite_metadata(&graph, &info).unwrap();
    let after_first = sorted_triples(&graph);
    let second = rewrite_metadata(&graph, &info).unwrap();
    let after_second = sorted_triples(&graph);

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
}

/// WHY: Each rewritten slot carries exactly the values of the tag being built
/// BREAKS: Stale values from the source file leak into the published page
#[test]
fn rewritten_slots_hold_single_current_values() {
    let temp_dir = TempDir::new().unwrap();
    let graph = load(&temp_dir);
    let tag = VersionTag::parse("v1.10", "v").unwrap();
    let previous = VersionTag::parse("v1.9", "v").unwrap();
    let languages = vec!["de".to_string(), "en".to_string()];
    let tables = BTreeMap::new();

    let info = ReleaseInfo {
        tag: &tag,
        previous: Some(&previous),
        modified: NaiveDate::from_ymd_opt(2024, 11, 2).unwrap(),
        short_name: "datafield",
        diagram_file: "datafield_diagram.svg",
        languages: &languages,
        iri_tables: &tables,
        competency_index: None,
    };
    rewrite_metadata(&graph, &info).unwrap();

    let single = |predicate: NamedNodeRef<'static>| -> String {
        let values = graph.ontology_values(predicate).unwrap();
        assert_eq!(values.len(), 1, "{} should have exactly one value", predicate);
        term_text(&values[0]).unwrap()
    };

    assert_eq!(single(OWL_VERSION_IRI), "https://w3id.org/gerps/datafield/1.10/");
    assert_eq!(single(OWL_PRIOR_VERSION), "https://w3id.org/gerps/datafield/1.9/");
    assert_eq!(single(OWL_VERSION_INFO), "1.10");
    assert_eq!(single(DCTERMS_MODIFIED), "2024-11-2");
    assert_eq!(single(VANN_PREFERRED_PREFIX), "datafield");
    assert_eq!(single(VANN_PREFERRED_URI), "https://w3id.org/gerps/datafield/");
    assert_eq!(single(DCTERMS_CITATION), "GERPS: Data field. Version 1.10.");

    let descriptions = graph.ontology_values(DCTERMS_DESCRIPTION).unwrap();
    assert_eq!(descriptions.len(), languages.len());
}

/// WHY: owl:priorVersion of one release is the owl:versionIRI of the release before it
/// BREAKS: The version chain in the generated pages points at nothing
#[test]
fn prior_version_matches_previous_version_iri() {
    let namespace = "https://w3id.org/gerps/datafield/";
    let tags = ["v1.2", "v1.9", "v1.10"];

    for pair in tags.windows(2) {
        let previous = VersionTag::parse(pair[0], "v").unwrap();
        let current = VersionTag::parse(pair[1], "v").unwrap();
        assert_ne!(version_iri(namespace, previous.version()), version_iri(namespace, current.version()));
        assert!(version_iri(namespace, previous.version()).ends_with(&format!("/{}/", previous.version())));
    }

    assert_eq!(version_iri(namespace, "1.10"), "https://w3id.org/gerps/datafield/1.10/");
    assert_eq!(version_iri("https://w3id.org/gerps/datafield#", "1.10"), "https://w3id.org/gerps/datafield/1.10/");
}
