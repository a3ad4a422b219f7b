//! N-Triples, N-Quads and Turtle output through `oxttl`.

use std::io;
use std::str::FromStr;

use oxrdf::{QuadRef, TripleRef};
use oxttl::{NQuadsSerializer, NTriplesSerializer, TurtleSerializer};
use serde::{Deserialize, Serialize};

use super::graph::NamedGraph;
use super::vocab::PREFIXES;
use crate::errors::{LinkerError, Result};

/// Output syntax for graph serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializationFormat {
    #[default]
    NQuads,
    NTriples,
    Turtle,
}

impl SerializationFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializationFormat::NQuads => "nquads",
            SerializationFormat::NTriples => "nt",
            SerializationFormat::Turtle => "turtle",
        }
    }
}

impl FromStr for SerializationFormat {
    type Err = LinkerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nquads" | "nq" => Ok(SerializationFormat::NQuads),
            "nt" | "ntriples" | "n-triples" => Ok(SerializationFormat::NTriples),
            "turtle" | "ttl" => Ok(SerializationFormat::Turtle),
            other => Err(LinkerError::Config {
                message: format!("unknown serialization format '{}'", other),
            }),
        }
    }
}

/// One statement per line.
pub fn to_ntriples<'a>(triples: impl IntoIterator<Item = TripleRef<'a>>) -> Result<String> {
    let mut writer = NTriplesSerializer::new().for_writer(Vec::new());
    for triple in triples {
        writer.serialize_triple(triple)?;
    }
    into_string(writer.finish())
}

/// One quad per line, labelled with each graph's identifier.
pub fn to_nquads<'a>(graphs: impl IntoIterator<Item = &'a NamedGraph>) -> Result<String> {
    let mut writer = NQuadsSerializer::new().for_writer(Vec::new());
    for graph in graphs {
        for t in graph.iter() {
            writer.serialize_quad(QuadRef::new(
                t.subject,
                t.predicate,
                t.object,
                graph.identifier().as_ref(),
            ))?;
        }
    }
    into_string(writer.finish())
}

/// Turtle using the ontology prefix table.
pub fn to_turtle<'a>(triples: impl IntoIterator<Item = TripleRef<'a>>) -> Result<String> {
    let mut serializer = TurtleSerializer::new();
    for (prefix, ns) in PREFIXES {
        serializer = serializer
            .with_prefix(*prefix, *ns)
            .map_err(|e| LinkerError::InvalidTerm {
                message: format!("prefix '{}': {}", prefix, e),
            })?;
    }
    let mut writer = serializer.for_writer(Vec::new());
    for triple in triples {
        writer.serialize_triple(triple)?;
    }
    into_string(writer.finish()?)
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| LinkerError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
