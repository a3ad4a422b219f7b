/// Relevance provenance writer.
///
/// Turns a resolution outcome into deterministic RDF triples and submits
/// them to the relevance graph of the triplestore.
mod relevance;

pub use relevance::{
    relevance_node_iri, Agent, RelevanceAnnotator, RelevanceAssignment, RelevanceWriteSummary,
};
