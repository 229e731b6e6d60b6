// Competency Question Contract Tests
//
// The competency step is optional: it either writes a complete answer set
// or nothing at all, and the ontology description only links to it when it
// succeeded.

use onto_release::competency::{
    run_competency_questions, CompetencyOutcome, ResultFormat, ANSWERS_DIR, INDEX_FILE,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ONTOLOGY: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix df: <https://w3id.org/gerps/datafield/> .
<https://w3id.org/gerps/datafield> a owl:Ontology .
df:Field a owl:Class .
"#;

const INDIVIDUALS: &str = r#"
@prefix df: <https://w3id.org/gerps/datafield/> .
df:north a df:Field .
"#;

struct Fixture {
    _dir: TempDir,
    ontology: PathBuf,
    individuals: PathBuf,
    config: PathBuf,
    out: PathBuf,
}

fn fixture(config: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    fs::write(root.join("datafield.ttl"), ONTOLOGY).unwrap();
    fs::write(root.join("datafield_individuals.ttl"), INDIVIDUALS).unwrap();
    fs::write(root.join("competency_questions.yaml"), config).unwrap();
    fs::create_dir_all(root.join("out")).unwrap();

    Fixture {
        ontology: root.join("datafield.ttl"),
        individuals: root.join("datafield_individuals.ttl"),
        config: root.join("competency_questions.yaml"),
        out: root.join("out"),
        _dir: dir,
    }
}

fn run(fixture: &Fixture, config: &Path) -> CompetencyOutcome {
    run_competency_questions(config, &fixture.ontology, Some(&fixture.individuals), &fixture.out)
}

/// WHY: Result links are numbered from 1 in configuration order, with the
///      extension of the format actually written
/// BREAKS: Links in published competency pages
#[test]
fn answers_numbered_from_one_with_format_extension() {
    let fixture = fixture(
        r#"
competency-questions:
  - plain: Which fields exist?
    query: "SELECT ?f WHERE { ?f a <https://w3id.org/gerps/datafield/Field> }"
  - plain: Is there any field?
    query: "ASK { ?f a <https://w3id.org/gerps/datafield/Field> }"
  - plain: Describe the fields
    query: "CONSTRUCT { ?f a <https://w3id.org/gerps/datafield/Field> } WHERE { ?f a <https://w3id.org/gerps/datafield/Field> }"
"#,
    );

    let CompetencyOutcome::Answered(report) = run(&fixture, &fixture.config) else {
        panic!("competency questions should be answered");
    };

    let links: Vec<&str> = report.answers.iter().map(|a| a.link.as_str()).collect();
    assert_eq!(links, vec!["cq_answers/cq_1.csv", "cq_answers/cq_2.xml", "cq_answers/cq_3.xml"]);
    assert_eq!(report.answers[0].format, ResultFormat::Csv);
    assert_eq!(report.index, INDEX_FILE);

    for answer in &report.answers {
        assert!(fixture.out.join(&answer.link).is_file(), "{} missing", answer.link);
    }

    let index = fs::read_to_string(fixture.out.join(INDEX_FILE)).unwrap();
    assert!(index.contains("## 1. Which fields exist?"));
    assert!(index.contains("## 3. Describe the fields"));
    assert!(index.contains("[Result](cq_answers/cq_2.xml)"));

    // Individuals are part of the query graph
    let csv = fs::read_to_string(fixture.out.join("cq_answers/cq_1.csv")).unwrap();
    assert!(csv.contains("https://w3id.org/gerps/datafield/north"));
}

/// WHY: A missing configuration is not an error for the release
/// BREAKS: Tags without competency questions abort the whole run
#[test]
fn missing_config_is_skipped() {
    let fixture = fixture("competency-questions: []\n");
    let outcome = run(&fixture, &fixture.out.join("absent.yaml"));

    assert!(matches!(outcome, CompetencyOutcome::Skipped { .. }));
    assert_eq!(outcome.index_link(), None);
    assert!(!fixture.out.join(INDEX_FILE).exists());
}

/// WHY: One bad query skips the whole step without partial output
/// REASON: All queries are evaluated before any file is written
/// BREAKS: Half-written answer folders get published next to the docs
#[test]
fn failing_query_leaves_no_partial_output() {
    let fixture = fixture(
        r#"
competency-questions:
  - plain: Fine
    query: "SELECT * WHERE { ?s ?p ?o }"
  - plain: Broken
    query: "SELEKT nothing"
"#,
    );

    let outcome = run(&fixture, &fixture.config);
    let CompetencyOutcome::Skipped { reason } = &outcome else {
        panic!("a failing query should skip the step");
    };
    assert!(reason.contains('2'), "reason should name the failing question: {}", reason);
    assert!(!fixture.out.join(INDEX_FILE).exists());
    assert!(!fixture.out.join(ANSWERS_DIR).exists());
}

/// WHY: A malformed file is reported, not silently treated as empty
#[test]
fn malformed_config_is_skipped_with_reason() {
    let fixture = fixture("questions: [unterminated\n");
    let outcome = run(&fixture, &fixture.config);

    let CompetencyOutcome::Skipped { reason } = outcome else {
        panic!("malformed configuration should skip the step");
    };
    assert!(!reason.is_empty());
}

/// WHY: Queries may use the prefixes the ontology files declare without
///      repeating them
/// REASON: Prefixes from the ontology and its individuals are bound before
///         each query is evaluated
/// BREAKS: Question files written against the ontology's own prefixes skip
///         the whole step with a parse error
#[test]
fn ontology_prefixes_are_bound_in_queries() {
    let fixture = fixture(
        r#"
competency-questions:
  - plain: Which fields exist?
    query: "SELECT ?f WHERE { ?f a df:Field }"
  - plain: Is there a field typed with an explicit prefix?
    query: "PREFIX df: <https://w3id.org/gerps/datafield/> ASK { ?f a df:Field }"
"#,
    );

    let CompetencyOutcome::Answered(report) = run(&fixture, &fixture.config) else {
        panic!("queries using the ontology's prefixes should be answered");
    };
    assert_eq!(report.answers.len(), 2);

    let csv = fs::read_to_string(fixture.out.join("cq_answers/cq_1.csv")).unwrap();
    assert!(csv.contains("https://w3id.org/gerps/datafield/north"));

    // The index shows the question as written
    let index = fs::read_to_string(fixture.out.join(INDEX_FILE)).unwrap();
    assert!(index.contains("SELECT ?f WHERE { ?f a df:Field }"));
    assert!(!index.contains("PREFIX owl:"));
}
