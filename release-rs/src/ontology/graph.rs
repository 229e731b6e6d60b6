/**
 * graph.rs
 * RDF graph of a single ontology file, backed by an in-memory Oxigraph store
 */

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::rdf;
use oxigraph::model::{GraphName, GraphNameRef, NamedNode, NamedNodeRef, Quad, Subject, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::vocab::{self, OWL_CLASS, OWL_ONTOLOGY};
use super::OntologyError;

/// RDF serialization implied by a file extension
pub fn format_for_path(path: &Path) -> Option<RdfFormat> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "ttl" => Some(RdfFormat::Turtle),
        "nt" => Some(RdfFormat::NTriples),
        "rdf" | "owl" => Some(RdfFormat::RdfXml),
        _ => None,
    }
}

/// Parse `path` into the default graph of `store`
pub fn load_into(store: &Store, path: &Path) -> Result<(), OntologyError> {
    if !path.is_file() {
        return Err(OntologyError::NotFound(format!("File not found: {}", path.display())));
    }

    let format = format_for_path(path)
        .ok_or_else(|| OntologyError::LoadError(format!("Unsupported RDF file: {}", path.display())))?;

    let content = fs::read(path)?;

    store
        .load_from_reader(format, content.as_slice())
        .map_err(|e| OntologyError::ParseError(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "Loaded RDF file");
    Ok(())
}

/// Rows of a SELECT query as variable name -> term
pub fn query_rows(store: &Store, query: &str) -> Result<Vec<HashMap<String, Term>>, OntologyError> {
    let results = store
        .query(query)
        .map_err(|e| OntologyError::QueryError(e.to_string()))?;

    match results {
        QueryResults::Solutions(solutions) => {
            let mut rows = Vec::new();

            for solution in solutions {
                let solution = solution.map_err(|e| OntologyError::QueryError(e.to_string()))?;

                let mut row = HashMap::new();
                for (var, term) in solution.iter() {
                    row.insert(var.as_str().to_string(), term.clone());
                }
                rows.push(row);
            }

            Ok(rows)
        }
        _ => Err(OntologyError::QueryError("Expected a SELECT query".to_string())),
    }
}

/// Quote a string as a SPARQL literal
pub fn sparql_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Longest common prefix of the class IRIs, cut back to the last `/` or `#`
///
/// Falls back to the ontology IRI when the classes do not share a host:
/// kept as is when it already ends in a separator, otherwise its last
/// segment is trimmed.
pub fn derive_namespace(ontology_iri: &str, class_iris: &[String]) -> String {
    if let Some(namespace) = common_namespace(class_iris) {
        return namespace;
    }

    if ontology_iri.ends_with('/') || ontology_iri.ends_with('#') {
        return ontology_iri.to_string();
    }

    match ontology_iri.rfind(['/', '#']) {
        Some(idx) if has_host(&ontology_iri[..=idx]) => ontology_iri[..=idx].to_string(),
        _ => format!("{}/", ontology_iri),
    }
}

fn common_namespace(iris: &[String]) -> Option<String> {
    let first = iris.first()?;
    let mut len = first.len();

    for iri in &iris[1..] {
        len = first
            .char_indices()
            .zip(iri.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0)
            .min(len);
    }

    let prefix = &first[..len];
    let cut = prefix.rfind(['/', '#'])?;
    let namespace = &prefix[..=cut];

    has_host(namespace).then(|| namespace.to_string())
}

/// `scheme://host/...` with a non-empty host
fn has_host(prefix: &str) -> bool {
    match prefix.find("://") {
        Some(idx) => {
            let rest = &prefix[idx + 3..];
            let host = rest.split(['/', '#']).next().unwrap_or("");
            !host.is_empty() && rest.len() > host.len()
        }
        None => false,
    }
}

/// A parsed ontology with its ontology entity and namespace resolved
pub struct OntologyGraph {
    store: Store,
    source: PathBuf,
    ontology: NamedNode,
    namespace: String,
}

impl OntologyGraph {
    /// Load an ontology file
    pub fn load(path: &Path) -> Result<Self, OntologyError> {
        let store = Store::new()?;
        load_into(&store, path)?;

        let ontology = Self::find_ontology_entity(&store, path)?;
        let classes = Self::named_subjects_of_type(&store, OWL_CLASS)?;
        let namespace = derive_namespace(ontology.as_str(), &classes);

        tracing::debug!(
            path = %path.display(),
            ontology = %ontology,
            namespace = %namespace,
            classes = classes.len(),
            "Parsed ontology"
        );

        Ok(Self {
            store,
            source: path.to_path_buf(),
            ontology,
            namespace,
        })
    }

    fn find_ontology_entity(store: &Store, path: &Path) -> Result<NamedNode, OntologyError> {
        let mut entities = Self::named_subjects_of_type(store, OWL_ONTOLOGY)?;
        entities.sort();

        match entities.len() {
            0 => Err(OntologyError::NotFound(format!(
                "No owl:Ontology entity in {}",
                path.display()
            ))),
            n => {
                if n > 1 {
                    tracing::warn!(
                        path = %path.display(),
                        count = n,
                        chosen = %entities[0],
                        "Several owl:Ontology entities, using the first"
                    );
                }
                NamedNode::new(entities[0].clone()).map_err(|e| OntologyError::ParseError(e.to_string()))
            }
        }
    }

    fn named_subjects_of_type(store: &Store, class: NamedNodeRef<'_>) -> Result<Vec<String>, OntologyError> {
        let mut subjects = Vec::new();
        for quad in store.quads_for_pattern(None, Some(rdf::TYPE), Some(class.into()), None) {
            if let Subject::NamedNode(node) = quad?.subject {
                subjects.push(node.into_string());
            }
        }
        subjects.dedup();
        Ok(subjects)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// IRI of the ontology entity
    pub fn ontology(&self) -> &NamedNode {
        &self.ontology
    }

    /// Namespace shared by the ontology's classes
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// All objects of `predicate` on the ontology entity
    pub fn ontology_values(&self, predicate: NamedNodeRef<'_>) -> Result<Vec<Term>, OntologyError> {
        let mut values = Vec::new();
        for quad in self
            .store
            .quads_for_pattern(Some(self.ontology.as_ref().into()), Some(predicate), None, None)
        {
            values.push(quad?.object);
        }
        Ok(values)
    }

    /// Remove every value of `predicate` from the ontology entity
    pub fn clear_ontology_values(&self, predicate: NamedNodeRef<'_>) -> Result<usize, OntologyError> {
        let quads: Vec<Quad> = self
            .store
            .quads_for_pattern(Some(self.ontology.as_ref().into()), Some(predicate), None, None)
            .collect::<Result<_, _>>()?;

        for quad in &quads {
            self.store.remove(quad)?;
        }
        Ok(quads.len())
    }

    /// Add `predicate object` to the ontology entity in the default graph
    pub fn add_ontology_value(&self, predicate: NamedNodeRef<'_>, object: impl Into<Term>) -> Result<(), OntologyError> {
        let quad = Quad::new(
            self.ontology.clone(),
            predicate.into_owned(),
            object.into(),
            GraphName::DefaultGraph,
        );
        self.store.insert(&quad)?;
        Ok(())
    }

    /// Serialize the default graph as Turtle with the usual prefixes bound
    pub fn to_turtle(&self, short_name: &str) -> Result<Vec<u8>, OntologyError> {
        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
        let prefixes = [
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
            ("owl", vocab::OWL),
            ("dcterms", vocab::DCTERMS),
            ("dc", vocab::DC),
            ("vann", vocab::VANN),
        ];
        for (prefix, iri) in prefixes {
            serializer = serializer
                .with_prefix(prefix, iri)
                .map_err(|e| OntologyError::SerializeError(e.to_string()))?;
        }
        if is_prefix_name(short_name) && prefixes.iter().all(|(p, _)| *p != short_name) {
            serializer = serializer
                .with_prefix(short_name, self.namespace.as_str())
                .map_err(|e| OntologyError::SerializeError(e.to_string()))?;
        }

        self.store
            .dump_graph_to_writer(GraphNameRef::DefaultGraph, serializer, Vec::new())
            .map_err(|e| OntologyError::SerializeError(e.to_string()))
    }

    /// Number of triples in the default graph
    pub fn len(&self) -> Result<usize, OntologyError> {
        Ok(self.store.len()?)
    }

    pub fn is_empty(&self) -> Result<bool, OntologyError> {
        Ok(self.store.is_empty()?)
    }
}

/// Conservative Turtle `PN_PREFIX` check
fn is_prefix_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    !name.ends_with('.') && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Plain string value of a term (literal value or IRI)
pub fn term_text(term: &Term) -> Option<String> {
    match term {
        Term::Literal(literal) => Some(literal.value().to_string()),
        Term::NamedNode(node) => Some(node.as_str().to_string()),
        _ => None,
    }
}

/// Language tag of a literal term
pub fn term_language(term: &Term) -> Option<&str> {
    match term {
        Term::Literal(literal) => literal.language(),
        _ => None,
    }
}
