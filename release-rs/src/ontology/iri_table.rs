//! Markdown tables of the ontology's labelled IRIs, one per language

use std::collections::BTreeMap;

use super::graph::{query_rows, sparql_string, OntologyGraph};
use super::OntologyError;
use oxigraph::model::Term;

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IriRow {
    pub iri: String,
    pub label: String,
}

/// File name of the table for `lang`
pub fn table_file_name(lang: &str) -> String {
    format!("iri_table_{}.md", lang)
}

/// Classes and properties inside the ontology namespace with a label in `lang`
///
/// Rows are strictly ascending by IRI; an entity with several labels in the
/// same language keeps the lexically smallest one.
pub fn labelled_entities(graph: &OntologyGraph, lang: &str) -> Result<Vec<IriRow>, OntologyError> {
    let query = format!(
        r#"
        PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
        PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
        PREFIX owl: <http://www.w3.org/2002/07/owl#>

        SELECT DISTINCT ?entity ?label
        WHERE {{
            VALUES ?type {{ owl:Class owl:ObjectProperty owl:DatatypeProperty rdf:Property }}
            ?entity rdf:type ?type ;
                    rdfs:label ?label .
            FILTER (isIRI(?entity))
            FILTER (langMatches(lang(?label), {}))
            FILTER (STRSTARTS(STR(?entity), {}))
        }}
        ORDER BY STR(?entity) STR(?label)
        "#,
        sparql_string(lang),
        sparql_string(graph.namespace())
    );

    let mut rows: BTreeMap<String, String> = BTreeMap::new();
    for row in query_rows(graph.store(), &query)? {
        let (Some(Term::NamedNode(entity)), Some(Term::Literal(label))) = (row.get("entity"), row.get("label")) else {
            continue;
        };
        rows.entry(entity.as_str().to_string())
            .or_insert_with(|| label.value().to_string());
    }

    Ok(rows.into_iter().map(|(iri, label)| IriRow { iri, label }).collect())
}

/// Two-column Markdown table, or an empty string when there are no rows
pub fn render_table(rows: &[IriRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = String::from("| IRI | Label |\n| --- | --- |\n");
    for row in rows {
        table.push_str(&format!("| <{}> | {} |\n", row.iri, escape_cell(&row.label)));
    }
    table
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// The rendered table for `lang`; empty when nothing matches
pub fn iri_table(graph: &OntologyGraph, lang: &str) -> Result<String, OntologyError> {
    let rows = labelled_entities(graph, lang)?;
    tracing::debug!(lang, rows = rows.len(), "Built IRI table");
    Ok(render_table(&rows))
}
