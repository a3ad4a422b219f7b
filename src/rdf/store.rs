use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use oxrdf::Graph;

use super::graph::NamedGraph;
use super::serialize::{self, SerializationFormat};
use super::Iri;
use crate::errors::Result;

/// An in-memory dataset of named graphs.
///
/// The store owns its graphs until it is dropped; nothing is evicted.
/// Mutation goes through `&mut self`, so a store cannot be shared between
/// writers without external synchronization.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graphs: BTreeMap<Iri, NamedGraph>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named graph for `identifier`, creating it if needed.
    pub fn create_named_graph(&mut self, identifier: &Iri) -> &mut NamedGraph {
        self.graphs
            .entry(identifier.clone())
            .or_insert_with(|| NamedGraph::new(identifier.clone()))
    }

    /// Merges the triples of `graph` into the named graph `identifier`.
    pub fn add_named_graph(&mut self, graph: &NamedGraph, identifier: &Iri) {
        self.create_named_graph(identifier).extend_from(graph);
    }

    pub fn named_graph(&self, identifier: &Iri) -> Option<&NamedGraph> {
        self.graphs.get(identifier)
    }

    pub fn named_graph_mut(&mut self, identifier: &Iri) -> Option<&mut NamedGraph> {
        self.graphs.get_mut(identifier)
    }

    /// Identifiers of all graphs held by the store.
    pub fn graph_identifiers(&self) -> impl Iterator<Item = &Iri> {
        self.graphs.keys()
    }

    /// Total number of triples across all graphs.
    pub fn len(&self) -> usize {
        self.graphs.values().map(NamedGraph::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializes the whole dataset.
    ///
    /// N-Quads keeps graph labels; N-Triples and Turtle flatten every graph
    /// into one triple stream.
    pub fn serialize(&self, format: SerializationFormat) -> Result<String> {
        match format {
            SerializationFormat::NQuads => serialize::to_nquads(self.graphs.values()),
            SerializationFormat::NTriples => {
                serialize::to_ntriples(self.graphs.values().flat_map(NamedGraph::iter))
            }
            SerializationFormat::Turtle => {
                let mut merged = Graph::new();
                for triple in self.graphs.values().flat_map(NamedGraph::iter) {
                    merged.insert(triple);
                }
                serialize::to_turtle(merged.iter())
            }
        }
    }

    /// Serializes the dataset and writes it to `destination`.
    pub fn serialize_to(&self, format: SerializationFormat, destination: &Path) -> Result<()> {
        fs::write(destination, self.serialize(format)?)?;
        Ok(())
    }
}
