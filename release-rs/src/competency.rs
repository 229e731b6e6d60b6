//! Competency questions
//!
//! A competency question pairs a natural-language requirement with a SPARQL
//! query that demonstrates the ontology can answer it. The questions live in
//! a YAML file inside the repository:
//!
//! ```yaml
//! competency-questions:
//!   - plain: Which fields have a type?
//!     query: |
//!       SELECT ?field ?type WHERE { ?field df:hasType ?type }
//! ```
//!
//! Each query runs against the ontology plus its `_individuals` companion.
//! Prefixes declared in those files (`@prefix df: <...>` in Turtle,
//! `xmlns:df="..."` in RDF/XML) are bound for every query, so `df:` needs no
//! `PREFIX` line of its own; a query's own declarations take precedence.
//! Results are written as CSV when the result set allows it and as XML
//! otherwise (boolean and graph results). Every query is evaluated before
//! anything is written, so one failing query leaves no partial output.

use once_cell::sync::Lazy;
use oxigraph::io::RdfFormat;
use oxigraph::sparql::results::QueryResultsFormat;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::ontology::graph::load_into;

/// Index document written next to the answers folder
pub const INDEX_FILE: &str = "competency_questions.md";

/// Folder holding one result file per question
pub const ANSWERS_DIR: &str = "cq_answers";

#[derive(Error, Debug)]
pub enum CompetencyError {
    #[error("Competency question file not found: {0}")]
    MissingConfig(String),

    #[error("Malformed competency question file: {0}")]
    MalformedConfig(String),

    #[error("Failed to load query graph: {0}")]
    Graph(String),

    #[error("Query {ordinal} failed: {message}")]
    Query { ordinal: usize, message: String },

    #[error("Cannot serialize result as {format}: {message}")]
    Serialization { format: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One question as written in the YAML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetencyQuestion {
    pub plain: String,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetencyConfig {
    #[serde(rename = "competency-questions")]
    pub questions: Vec<CompetencyQuestion>,
}

impl CompetencyConfig {
    pub fn load(path: &Path) -> Result<Self, CompetencyError> {
        if !path.is_file() {
            return Err(CompetencyError::MissingConfig(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config: CompetencyConfig = serde_yaml::from_str(&content)
            .map_err(|e| CompetencyError::MalformedConfig(format!("{}: {}", path.display(), e)))?;

        Ok(config)
    }
}

/// Serialization a result file ended up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    Csv,
    Xml,
}

impl ResultFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ResultFormat::Csv => "csv",
            ResultFormat::Xml => "xml",
        }
    }
}

/// A question whose result file was written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnsweredQuestion {
    /// 1-based position in the configuration
    pub ordinal: usize,
    pub plain: String,
    pub query: String,
    pub format: ResultFormat,
    /// Link relative to the index document (`cq_answers/cq_1.csv`)
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyReport {
    pub answers: Vec<AnsweredQuestion>,
    /// Index document name relative to the output directory
    pub index: String,
}

/// Result of the optional competency step for one tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompetencyOutcome {
    Answered(CompetencyReport),
    Skipped { reason: String },
}

impl CompetencyOutcome {
    /// Index link for the ontology description, when answered
    pub fn index_link(&self) -> Option<&str> {
        match self {
            CompetencyOutcome::Answered(report) => Some(report.index.as_str()),
            CompetencyOutcome::Skipped { .. } => None,
        }
    }
}

static TURTLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^\s*@?prefix\s+([A-Za-z][\w.\-]*)?:\s*<([^>\s]*)>").expect("turtle prefix pattern is valid")
});

static XMLNS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"xmlns:([A-Za-z][\w.\-]*)\s*=\s*["']([^"'\s]*)["']"#).expect("xmlns pattern is valid")
});

/// Namespace prefixes declared in RDF source files, prefix -> IRI
///
/// The first declaration of a prefix wins. An empty key is the default
/// (`:`) prefix. Relative namespace IRIs are ignored, queries have no base.
pub fn declared_prefixes(paths: &[&Path]) -> Result<BTreeMap<String, String>, CompetencyError> {
    let mut prefixes = BTreeMap::new();
    for path in paths {
        let content = fs::read_to_string(path)?;
        for pattern in [&*TURTLE_PREFIX, &*XMLNS_PREFIX] {
            for caps in pattern.captures_iter(&content) {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let iri = &caps[2];
                if !iri.contains(':') {
                    continue;
                }
                prefixes.entry(prefix.to_string()).or_insert_with(|| iri.to_string());
            }
        }
    }
    Ok(prefixes)
}

/// `PREFIX` lines binding `prefixes`, one per line
pub fn prefix_prologue(prefixes: &BTreeMap<String, String>) -> String {
    prefixes
        .iter()
        .map(|(prefix, iri)| format!("PREFIX {}: <{}>\n", prefix, iri))
        .collect()
}

/// Ontology plus example individuals
pub fn load_query_graph(ontology: &Path, individuals: Option<&Path>) -> Result<Store, CompetencyError> {
    let store = Store::new().map_err(|e| CompetencyError::Graph(e.to_string()))?;
    load_into(&store, ontology).map_err(|e| CompetencyError::Graph(e.to_string()))?;
    if let Some(individuals) = individuals {
        load_into(&store, individuals).map_err(|e| CompetencyError::Graph(e.to_string()))?;
    }
    Ok(store)
}

fn write_csv(results: QueryResults) -> Result<Vec<u8>, CompetencyError> {
    let unsupported = |kind: &str| CompetencyError::Serialization {
        format: "CSV",
        message: format!("{} results have no tabular form", kind),
    };

    match results {
        QueryResults::Solutions(_) => {
            let mut buffer = Vec::new();
            results
                .write(&mut buffer, QueryResultsFormat::Csv)
                .map_err(|e| CompetencyError::Serialization {
                    format: "CSV",
                    message: e.to_string(),
                })?;
            Ok(buffer)
        }
        QueryResults::Boolean(_) => Err(unsupported("Boolean")),
        QueryResults::Graph(_) => Err(unsupported("Graph")),
    }
}

fn write_xml(results: QueryResults) -> Result<Vec<u8>, CompetencyError> {
    let mut buffer = Vec::new();
    let written = match results {
        QueryResults::Graph(_) => results.write_graph(&mut buffer, RdfFormat::RdfXml).map(|_| ()),
        _ => results.write(&mut buffer, QueryResultsFormat::Xml).map(|_| ()),
    };
    written.map_err(|e| CompetencyError::Serialization {
        format: "XML",
        message: e.to_string(),
    })?;
    Ok(buffer)
}

/// Evaluate one query, serialized as CSV or, failing that, XML
pub fn answer(store: &Store, ordinal: usize, query: &str) -> Result<(ResultFormat, Vec<u8>), CompetencyError> {
    let evaluate = || {
        store.query(query).map_err(|e| CompetencyError::Query {
            ordinal,
            message: e.to_string(),
        })
    };

    match write_csv(evaluate()?) {
        Ok(bytes) => Ok((ResultFormat::Csv, bytes)),
        Err(csv_error) => {
            tracing::debug!(ordinal, error = %csv_error, "CSV not possible, falling back to XML");
            // Results are a one-shot iterator, so the query runs again
            let bytes = write_xml(evaluate()?)?;
            Ok((ResultFormat::Xml, bytes))
        }
    }
}

/// Markdown index with one section per question
pub fn render_index(answers: &[AnsweredQuestion]) -> String {
    let mut doc = String::from("# Competency Questions\n");
    for answer in answers {
        doc.push_str(&format!(
            "\n## {}. {}\n\n```sparql\n{}\n```\n\n[Result]({})\n",
            answer.ordinal,
            answer.plain.trim(),
            answer.query.trim_end(),
            answer.link
        ));
    }
    doc
}

/// Runs a list of competency questions against a query graph
pub struct CompetencyRunner<'a> {
    store: &'a Store,
    prologue: String,
}

impl<'a> CompetencyRunner<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            prologue: String::new(),
        }
    }

    /// Bind `prefixes` in every query
    pub fn with_prefixes(mut self, prefixes: &BTreeMap<String, String>) -> Self {
        self.prologue = prefix_prologue(prefixes);
        self
    }

    /// Answer every question and write the index plus result files into `out_dir`
    pub fn run(&self, questions: &[CompetencyQuestion], out_dir: &Path) -> Result<CompetencyReport, CompetencyError> {
        let mut evaluated = Vec::with_capacity(questions.len());
        for (idx, question) in questions.iter().enumerate() {
            let ordinal = idx + 1;
            let query = format!("{}{}", self.prologue, question.query);
            let (format, bytes) = answer(self.store, ordinal, &query)?;
            evaluated.push((ordinal, question, format, bytes));
        }

        let answers_dir = out_dir.join(ANSWERS_DIR);
        fs::create_dir_all(&answers_dir)?;

        let mut answers = Vec::with_capacity(evaluated.len());
        for (ordinal, question, format, bytes) in evaluated {
            let file_name = format!("cq_{}.{}", ordinal, format.extension());
            fs::write(answers_dir.join(&file_name), bytes)?;

            answers.push(AnsweredQuestion {
                ordinal,
                plain: question.plain.clone(),
                query: question.query.clone(),
                format,
                link: format!("{}/{}", ANSWERS_DIR, file_name),
            });
        }

        fs::write(out_dir.join(INDEX_FILE), render_index(&answers))?;

        tracing::info!(questions = answers.len(), out = %out_dir.display(), "Answered competency questions");

        Ok(CompetencyReport {
            answers,
            index: INDEX_FILE.to_string(),
        })
    }
}

/// Whole competency step for one tag; any failure turns into `Skipped`
pub fn run_competency_questions(
    config_path: &Path,
    ontology: &Path,
    individuals: Option<&Path>,
    out_dir: &Path,
) -> CompetencyOutcome {
    let attempt = || -> Result<CompetencyReport, CompetencyError> {
        let config = CompetencyConfig::load(config_path)?;
        let store = load_query_graph(ontology, individuals)?;
        let sources: Vec<&Path> = std::iter::once(ontology).chain(individuals).collect();
        let prefixes = declared_prefixes(&sources)?;
        CompetencyRunner::new(&store)
            .with_prefixes(&prefixes)
            .run(&config.questions, out_dir)
    };

    match attempt() {
        Ok(report) => CompetencyOutcome::Answered(report),
        Err(e) => {
            tracing::warn!(config = %config_path.display(), reason = %e, "Skipping competency questions");
            CompetencyOutcome::Skipped { reason: e.to_string() }
        }
    }
}
