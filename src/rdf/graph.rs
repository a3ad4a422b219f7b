use oxrdf::{Graph, Term, Triple, TripleRef};

use super::serialize::{self, SerializationFormat};
use super::Iri;
use crate::errors::Result;

/// A set of triples addressed by an IRI.
///
/// Adding a triple twice is a no-op.
#[derive(Debug, Clone)]
pub struct NamedGraph {
    identifier: Iri,
    graph: Graph,
}

impl NamedGraph {
    pub fn new(identifier: Iri) -> Self {
        Self {
            identifier,
            graph: Graph::new(),
        }
    }

    pub fn identifier(&self) -> &Iri {
        &self.identifier
    }

    /// Adds a triple, returning `false` if it was already present.
    pub fn add(&mut self, triple: &Triple) -> bool {
        self.graph.insert(triple)
    }

    /// Convenience wrapper around [`NamedGraph::add`].
    pub fn insert(&mut self, subject: &Iri, predicate: Iri, object: impl Into<Term>) -> bool {
        self.add(&Triple::new(subject.clone(), predicate, object))
    }

    /// Merges every triple of `other` into this graph.
    pub fn extend_from(&mut self, other: &NamedGraph) {
        for triple in other.iter() {
            self.graph.insert(triple);
        }
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.graph.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = TripleRef<'_>> {
        self.graph.iter()
    }

    /// Triples whose subject is `subject`.
    pub fn triples_for<'a>(&'a self, subject: &'a Iri) -> impl Iterator<Item = TripleRef<'a>> + 'a {
        self.graph.triples_for_subject(subject.as_ref())
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Serializes this graph on its own.
    ///
    /// N-Quads output carries this graph's identifier as the graph label.
    pub fn serialize(&self, format: SerializationFormat) -> Result<String> {
        match format {
            SerializationFormat::NTriples => serialize::to_ntriples(self.iter()),
            SerializationFormat::NQuads => serialize::to_nquads(std::iter::once(self)),
            SerializationFormat::Turtle => serialize::to_turtle(self.iter()),
        }
    }
}
