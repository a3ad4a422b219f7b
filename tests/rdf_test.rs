use concept_linker::rdf::vocab::{rdf, rdfs, top};
use concept_linker::errors::LinkerError;
use concept_linker::rdf::{
    lang_literal, GraphStore, Iri, NamedGraph, SerializationFormat, Triple,
};
use std::fs;
use tempfile::TempDir;

fn iri(s: &str) -> Iri {
    concept_linker::rdf::iri(s).unwrap()
}

fn sample_graph(identifier: &str) -> NamedGraph {
    let mut g = NamedGraph::new(iri(identifier));
    let agent = iri("https://w3id.org/hacid/mdx/data/agent/rag");
    g.insert(&agent, rdf::type_(), top::agent());
    g.insert(&agent, rdfs::label(), lang_literal("RAG", "en"));
    g
}

#[test]
fn test_create_named_graph_is_get_or_create() {
    let mut store = GraphStore::new();
    let id = iri("https://example.org/g");
    store
        .create_named_graph(&id)
        .insert(&iri("https://example.org/s"), rdf::type_(), top::agent());
    let again = store.create_named_graph(&id);
    assert_eq!(again.len(), 1);
    assert_eq!(store.graph_identifiers().count(), 1);
}

#[test]
fn test_add_named_graph_merges_and_dedups() {
    let mut store = GraphStore::new();
    let id = iri("https://example.org/g");
    store.add_named_graph(&sample_graph("https://example.org/a"), &id);
    store.add_named_graph(&sample_graph("https://example.org/b"), &id);
    assert_eq!(store.len(), 2);
    assert_eq!(store.named_graph(&id).unwrap().identifier(), &id);
    assert!(store.named_graph(&iri("https://example.org/a")).is_none());
}

#[test]
fn test_named_graph_ignores_duplicate_triples() {
    let mut g = sample_graph("https://example.org/g");
    let agent = iri("https://w3id.org/hacid/mdx/data/agent/rag");
    assert!(!g.insert(&agent, rdf::type_(), top::agent()));
    assert_eq!(g.len(), 2);
    assert_eq!(g.triples_for(&agent).count(), 2);
    assert!(g.contains(&Triple::new(agent.clone(), rdf::type_(), top::agent())));
}

#[test]
fn test_serialize_nquads_carries_graph_label() {
    let mut store = GraphStore::new();
    let id = iri("https://example.org/g");
    store.add_named_graph(&sample_graph("https://example.org/g"), &id);
    let text = store.serialize(SerializationFormat::NQuads).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|l| l.ends_with("<https://example.org/g> .")));
    assert!(text.contains("\"RAG\"@en"));
}

#[test]
fn test_serialize_turtle_compacts_prefixes() {
    let mut store = GraphStore::new();
    let id = iri("https://example.org/g");
    store.add_named_graph(&sample_graph("https://example.org/g"), &id);
    let text = store.serialize(SerializationFormat::Turtle).unwrap();
    assert!(text.contains("top: <https://w3id.org/hacid/onto/top-level/>"));
    assert!(text.contains("top:Agent"));
    assert!(text.contains("\"RAG\"@en"));
    assert!(!text.contains("<https://w3id.org/hacid/onto/top-level/Agent>"));
    assert!(text.trim_end().ends_with('.'));
}

#[test]
fn test_serialize_empty_store() {
    let store = GraphStore::new();
    assert!(store.is_empty());
    assert_eq!(store.serialize(SerializationFormat::NTriples).unwrap(), "");
    assert_eq!(store.serialize(SerializationFormat::NQuads).unwrap(), "");
}

#[test]
fn test_serialize_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("relevance.nt");
    let mut store = GraphStore::new();
    store.add_named_graph(
        &sample_graph("https://example.org/g"),
        &iri("https://example.org/g"),
    );
    store
        .serialize_to(SerializationFormat::NTriples, &path)
        .unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, store.serialize(SerializationFormat::NTriples).unwrap());
    assert_eq!(written.lines().count(), 2);
}

#[test]
fn test_format_from_str() {
    assert_eq!(
        "ttl".parse::<SerializationFormat>().unwrap(),
        SerializationFormat::Turtle
    );
    assert_eq!(
        "N-Triples".parse::<SerializationFormat>().unwrap(),
        SerializationFormat::NTriples
    );
    assert!("rdfxml".parse::<SerializationFormat>().is_err());
}

#[test]
fn test_iri_rejects_injection() {
    for bad in ["https://example.org/a> <b", "relative/path", ""] {
        let parsed = concept_linker::rdf::iri(bad);
        assert!(matches!(parsed, Err(LinkerError::InvalidTerm { .. })));
    }
}

#[test]
fn test_serialize_ntriples_escapes_literal_text() {
    let mut store = GraphStore::new();
    let id = iri("https://example.org/g");
    let s = iri("https://example.org/s");
    store
        .create_named_graph(&id)
        .insert(&s, rdfs::label(), lang_literal("line\tone \"two\"\\", "en"));
    let text = store.serialize(SerializationFormat::NTriples).unwrap();
    assert_eq!(
        text,
        "<https://example.org/s> <http://www.w3.org/2000/01/rdf-schema#label> \"line\\tone \\\"two\\\"\\\\\"@en .\n"
    );
}
