//! End-to-end pipeline runs over a scratch git repository
//!
//! A shell script stands in for WIDOCO: it writes an index page and a copy of
//! the ontology it was given into `<outFolder>/doc/`, so the tests can check
//! both the flattening and the rewritten metadata the generator saw.

#![cfg(unix)]

use onto_release::config::{GeneratorConfig, PipelineConfig};
use onto_release::ontology::graph::term_text;
use onto_release::ontology::vocab::{DCTERMS_DESCRIPTION, DCTERMS_MODIFIED, OWL_PRIOR_VERSION, OWL_VERSION_IRI};
use onto_release::{OntologyGraph, Pipeline, ReleaseError};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use walkdir::WalkDir;

// ==================== Test Helper Functions ====================

const GENERATOR_SCRIPT: &str = r#"
out=""
ont=""
while [ "$#" -gt 0 ]; do
  case "$1" in
    -outFolder) out="$2" ;;
    -ontFile) ont="$2" ;;
  esac
  shift
done
mkdir -p "$out/doc"
echo "generated" > "$out/doc/index-en.html"
cp "$ont" "$out/doc/ontology.ttl"
"#;

const COMPETENCY: &str = r#"
competency-questions:
  - plain: Which fields exist?
    query: |
      PREFIX df: <https://w3id.org/gerps/datafield/>
      SELECT ?field WHERE { ?field a df:Field } ORDER BY ?field
  - plain: Is there a zone?
    query: |
      ASK { ?zone a <https://w3id.org/gerps/datafield/Zone> }
"#;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", "2024-03-05T10:00:00+00:00")
        .env("GIT_COMMITTER_DATE", "2024-03-05T10:00:00+00:00")
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

fn ontology(label: &str) -> String {
    format!(
        r#"@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix df: <https://w3id.org/gerps/datafield/> .

<https://w3id.org/gerps/datafield> a owl:Ontology ;
    dcterms:title "Datafield"@en ;
    dcterms:creator "GERPS" ;
    owl:versionInfo "stale" .

df:Field a owl:Class ; rdfs:label "{}"@en , "Feld"@de .
df:Zone a owl:Class ; rdfs:label "Zone"@en .
"#,
        label
    )
}

const INDIVIDUALS: &str = r#"
@prefix df: <https://w3id.org/gerps/datafield/> .
df:north a df:Field .
"#;

/// Three commits tagged v1.2, v1.9, v1.10; only the later two carry competency questions
fn create_release_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.name", "Release Bot"]);
    git(dir, &["config", "user.email", "release@example.org"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "tag.gpgsign", "false"]);

    let onto_dir = dir.join("ontology");
    fs::create_dir_all(&onto_dir).unwrap();
    fs::write(onto_dir.join("datafield_individuals.ttl"), INDIVIDUALS).unwrap();
    fs::write(onto_dir.join("datafield_diagram.svg"), "<svg/>").unwrap();
    fs::write(dir.join("index.html"), "<html>index</html>").unwrap();

    for (tag, label) in [("v1.2", "Field 1.2"), ("v1.9", "Field 1.9"), ("v1.10", "Field 1.10")] {
        fs::write(onto_dir.join("datafield.ttl"), ontology(label)).unwrap();
        if tag != "v1.2" {
            fs::write(dir.join("competency_questions.yaml"), COMPETENCY).unwrap();
        }
        git(dir, &["add", "."]);
        git(dir, &["commit", "-q", "-m", tag]);
        git(dir, &["tag", tag]);
    }

    fs::write(onto_dir.join("datafield.ttl"), ontology("Work in progress")).unwrap();
    temp_dir
}

fn config(repo: &Path, out: &Path, script: &str) -> PipelineConfig {
    PipelineConfig {
        repository: repo.to_path_buf(),
        output_dir: out.to_path_buf(),
        generator: GeneratorConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            fail_on_error: false,
        },
        ..PipelineConfig::default()
    }
}

/// Relative path -> contents of every file under `root`, skipping the top-level `skip` folders
fn file_set(root: &Path, skip: &[&str]) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() == 1 && entry.file_type().is_dir() && skip.iter().any(|s| entry.file_name() == *s))
        })
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap().to_string_lossy().to_string();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

fn values(graph: &OntologyGraph, predicate: oxigraph::model::NamedNodeRef<'_>) -> Vec<String> {
    let mut values: Vec<String> = graph
        .ontology_values(predicate)
        .unwrap()
        .iter()
        .filter_map(term_text)
        .collect();
    values.sort();
    values
}

// ==================== Tests ====================

#[test]
fn test_full_release_run() {
    let repo = create_release_repo();
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("out");

    let summary = Pipeline::new(config(repo.path(), &out, GENERATOR_SCRIPT)).run().unwrap();

    let versions: Vec<&str> = summary.tags.iter().map(|r| r.version.as_str()).collect();
    assert_eq!(versions, vec!["1.2", "1.9", "1.10"]);
    assert_eq!(summary.latest().unwrap().version, "1.10");
    assert!(summary.tags.iter().all(|r| r.generation.success && r.generation.flattened));

    for version in ["1.2", "1.9", "1.10"] {
        let dir = out.join(version);
        assert!(dir.join("index-en.html").exists(), "{} has no docs", version);
        assert!(!dir.join("doc").exists());
        assert!(dir.join("datafield_diagram.svg").exists());
        assert!(dir.join("index.html").exists());
        assert!(dir.join("iri_table_en.md").exists());
        assert!(dir.join("iri_table_de.md").exists());
    }

    // Latest mirror: the output root minus version folders equals out/1.10
    let mirror = file_set(&out, &versions);
    assert_eq!(mirror, file_set(&out.join("1.10"), &[]));
    assert!(mirror.contains_key("ontology.ttl"));
    assert!(out.join("competency_questions.md").exists());

    // The working tree is untouched
    let working = fs::read_to_string(repo.path().join("ontology/datafield.ttl")).unwrap();
    assert!(working.contains("Work in progress"));
}

#[test]
fn test_rerun_drops_files_the_new_latest_lacks() {
    let repo = create_release_repo();
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("out");

    Pipeline::new(config(repo.path(), &out, GENERATOR_SCRIPT)).run().unwrap();
    assert!(out.join("competency_questions.md").exists());
    assert!(out.join("cq_answers").is_dir());

    // v1.11 drops the competency questions
    let dir = repo.path();
    fs::write(dir.join("ontology/datafield.ttl"), ontology("Field 1.11")).unwrap();
    git(dir, &["rm", "-q", "competency_questions.yaml"]);
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", "v1.11"]);
    git(dir, &["tag", "v1.11"]);

    let summary = Pipeline::new(config(dir, &out, GENERATOR_SCRIPT)).run().unwrap();
    assert_eq!(summary.latest().unwrap().version, "1.11");
    assert!(summary.latest().unwrap().competency.index_link().is_none());

    assert!(!out.join("competency_questions.md").exists());
    assert!(!out.join("cq_answers").exists());
    assert!(out.join("1.10/competency_questions.md").exists());

    let versions = ["1.2", "1.9", "1.10", "1.11"];
    assert_eq!(file_set(&out, &versions), file_set(&out.join("1.11"), &[]));
}

#[test]
fn test_rewritten_metadata_links_versions() {
    let repo = create_release_repo();
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("out");

    Pipeline::new(config(repo.path(), &out, GENERATOR_SCRIPT)).run().unwrap();

    let first = OntologyGraph::load(&out.join("1.2/ontology.ttl")).unwrap();
    assert_eq!(values(&first, OWL_VERSION_IRI), vec!["https://w3id.org/gerps/datafield/1.2/"]);
    assert!(values(&first, OWL_PRIOR_VERSION).is_empty());
    assert_eq!(values(&first, DCTERMS_MODIFIED), vec!["2024-3-5"]);

    let latest = OntologyGraph::load(&out.join("1.10/ontology.ttl")).unwrap();
    assert_eq!(values(&latest, OWL_VERSION_IRI), vec!["https://w3id.org/gerps/datafield/1.10/"]);
    assert_eq!(values(&latest, OWL_PRIOR_VERSION), vec!["https://w3id.org/gerps/datafield/1.9/"]);

    let iri_table = fs::read_to_string(out.join("1.10/iri_table_en.md")).unwrap();
    assert!(iri_table.contains("| <https://w3id.org/gerps/datafield/Field> | Field 1.10 |"));
}

#[test]
fn test_missing_competency_config_leaves_no_link() {
    let repo = create_release_repo();
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("out");

    let summary = Pipeline::new(config(repo.path(), &out, GENERATOR_SCRIPT)).run().unwrap();
    assert!(summary.tags[0].competency.index_link().is_none());
    assert_eq!(summary.tags[1].competency.index_link(), Some("competency_questions.md"));

    assert!(!out.join("1.2/competency_questions.md").exists());
    let first = OntologyGraph::load(&out.join("1.2/ontology.ttl")).unwrap();
    let descriptions = values(&first, DCTERMS_DESCRIPTION);
    assert_eq!(descriptions.len(), 2);
    assert!(descriptions.iter().all(|d| !d.contains("competency_questions.md")));
    assert!(descriptions.iter().all(|d| d.contains("datafield_diagram.svg")));

    let answered = out.join("1.9");
    assert!(answered.join("cq_answers/cq_1.csv").exists());
    assert!(answered.join("cq_answers/cq_2.xml").exists());
    let second = OntologyGraph::load(&answered.join("ontology.ttl")).unwrap();
    assert!(values(&second, DCTERMS_DESCRIPTION)
        .iter()
        .all(|d| d.contains("competency_questions.md")));

    let csv = fs::read_to_string(answered.join("cq_answers/cq_1.csv")).unwrap();
    assert!(csv.contains("https://w3id.org/gerps/datafield/north"));
}

#[test]
fn test_repository_without_tags_is_empty_run() {
    let repo = TempDir::new().unwrap();
    git(repo.path(), &["init", "-q"]);
    let out_dir = TempDir::new().unwrap();

    let summary = Pipeline::new(config(repo.path(), &out_dir.path().join("out"), GENERATOR_SCRIPT))
        .run()
        .unwrap();
    assert!(summary.is_empty());
    assert!(!out_dir.path().join("out").exists());
}

#[test]
fn test_generator_failure_policy() {
    let repo = create_release_repo();
    let out_dir = TempDir::new().unwrap();

    let lenient = config(repo.path(), &out_dir.path().join("lenient"), "exit 2");
    let summary = Pipeline::new(lenient).run().unwrap();
    assert_eq!(summary.tags.len(), 3);
    assert!(summary.tags.iter().all(|r| r.generation.exit_code == Some(2)));
    assert!(out_dir.path().join("lenient/iri_table_en.md").exists());

    let mut strict = config(repo.path(), &out_dir.path().join("strict"), "exit 2");
    strict.generator.fail_on_error = true;
    let result = Pipeline::new(strict).run();
    assert!(matches!(result, Err(ReleaseError::Generator(_))));
}
