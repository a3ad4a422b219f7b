//! RDF model and serialization, backed by `oxrdf` and `oxttl`.

/// Ontology namespaces and vocabulary.
pub mod vocab;

/// Named graphs and the in-memory dataset holding them.
pub mod graph;
pub mod store;

/// Graph serializers.
pub mod serialize;

pub use graph::NamedGraph;
pub use oxrdf::{Literal, NamedNode, Term, Triple, TripleRef};
pub use serialize::SerializationFormat;
pub use store::GraphStore;

use crate::errors::{LinkerError, Result};

/// An absolute IRI node.
pub type Iri = NamedNode;

/// Parses `value` as an absolute IRI.
///
/// Anything that could not appear between `<` and `>` in N-Triples or SPARQL
/// is rejected, so the result can be written into a query as is.
pub fn iri(value: impl Into<String>) -> Result<Iri> {
    let value = value.into();
    NamedNode::new(value.as_str()).map_err(|e| LinkerError::InvalidTerm {
        message: format!("invalid IRI '{}': {}", value, e),
    })
}

/// Language-tagged literal. The tag is one of the fixed tags this crate emits.
pub fn lang_literal(value: impl Into<String>, lang: &'static str) -> Literal {
    Literal::new_language_tagged_literal_unchecked(value, lang)
}
