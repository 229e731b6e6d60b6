//! Vocabulary used by the metadata rewrite and the IRI tables

use oxigraph::model::NamedNodeRef;

pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const DCTERMS: &str = "http://purl.org/dc/terms/";
pub const DC: &str = "http://purl.org/dc/elements/1.1/";
pub const VANN: &str = "http://purl.org/vocab/vann/";

pub const OWL_ONTOLOGY: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
pub const OWL_CLASS: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
pub const OWL_VERSION_IRI: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#versionIRI");
pub const OWL_PRIOR_VERSION: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#priorVersion");
pub const OWL_VERSION_INFO: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#versionInfo");

pub const DCTERMS_MODIFIED: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://purl.org/dc/terms/modified");
pub const DCTERMS_DESCRIPTION: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://purl.org/dc/terms/description");
pub const DCTERMS_CITATION: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://purl.org/dc/terms/bibliographicCitation");
pub const DCTERMS_CREATOR: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://purl.org/dc/terms/creator");
pub const DCTERMS_TITLE: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://purl.org/dc/terms/title");
pub const DC_CREATOR: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/creator");
pub const DC_TITLE: NamedNodeRef<'static> = NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/title");

pub const VANN_PREFERRED_PREFIX: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://purl.org/vocab/vann/preferredNamespacePrefix");
pub const VANN_PREFERRED_URI: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://purl.org/vocab/vann/preferredNamespaceUri");

/// Predicates the rewrite clears and re-populates on the ontology entity
pub const REWRITTEN_PREDICATES: [NamedNodeRef<'static>; 8] = [
    DCTERMS_MODIFIED,
    OWL_VERSION_IRI,
    VANN_PREFERRED_PREFIX,
    VANN_PREFERRED_URI,
    OWL_PRIOR_VERSION,
    OWL_VERSION_INFO,
    DCTERMS_DESCRIPTION,
    DCTERMS_CITATION,
];
