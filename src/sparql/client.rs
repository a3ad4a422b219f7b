use std::collections::BTreeSet;

use tracing::{debug, error};

use crate::config::LinkerConfig;
use crate::errors::{LinkerError, Result};
use crate::rdf::{iri, Iri, NamedGraph, SerializationFormat};
use crate::rdf::vocab::MDX;
use crate::types::ConceptId;

use super::builder::QueryTemplate;
use super::results::ResultSet;
use super::service::{HttpSparqlService, SparqlService};

const BROADER_QUERY: &str = "
SELECT DISTINCT ?broader
WHERE {
  %{concept} mdx:broader ?broader .
}";

const NARROWER_QUERY: &str = "
SELECT DISTINCT ?narrower
WHERE {
  ?narrower mdx:broader %{concept} .
}";

const RELATED_QUERY: &str = "
SELECT DISTINCT ?otherEntity
WHERE {
  %{concept} mdx:isDescribedBy ?desc .
  ?desc ?property ?otherEntity .
  ?otherEntity a ?otherEntityClass ;
               mdx:fullySpecifiedName [] .
  FILTER (STRSTARTS(STR(?property), %{domain}) && STR(?property) != %{domain})
  FILTER (?otherEntity != %{concept})
}";

const GRAPH_NONEMPTY_QUERY: &str = "ASK { GRAPH %{graph} { ?s ?p ?o } }";

const CLEAR_GRAPH_UPDATE: &str = "WITH %{graph} DELETE { ?s ?p ?o } WHERE { ?s ?p ?o }";

/// Client for the clinical knowledge graph.
///
/// Wraps a [`SparqlService`] with typed traversal helpers and the update
/// operations used by the relevance annotator.
pub struct KgClient<S = HttpSparqlService> {
    service: S,
    data_namespace: String,
}

impl KgClient<HttpSparqlService> {
    /// Builds a client talking HTTP to the endpoints in `config`.
    pub fn from_config(config: &LinkerConfig) -> Self {
        Self::new(
            HttpSparqlService::new(&config.triplestore, &config.http),
            config.namespaces.data.clone(),
        )
    }
}

impl<S: SparqlService> KgClient<S> {
    pub fn new(service: S, data_namespace: impl Into<String>) -> Self {
        Self {
            service,
            data_namespace: data_namespace.into(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn data_namespace(&self) -> &str {
        &self.data_namespace
    }

    /// IRI of a concept: the data namespace followed by the bare id.
    pub fn concept_iri(&self, id: &ConceptId) -> Result<Iri> {
        iri(format!("{}{}", self.data_namespace, id))
    }

    /// Strips the data namespace from `value` and validates the remainder.
    pub fn concept_id_from_iri(&self, value: &str) -> Result<ConceptId> {
        ConceptId::new(value.strip_prefix(&self.data_namespace).unwrap_or(value))
    }

    /// Executes a read query and returns the complete result set.
    pub fn query(&self, query: &str) -> Result<ResultSet> {
        self.service.query(query).map_err(|e| {
            error!(error = %e, "SPARQL query error");
            match e {
                e @ LinkerError::QueryExecution { .. } => e,
                other => LinkerError::QueryExecution {
                    message: other.to_string(),
                    query: query.to_string(),
                },
            }
        })
    }

    /// Executes an ASK query. A payload without a `boolean` field is `false`.
    pub fn ask(&self, query: &str) -> Result<bool> {
        Ok(self.query(query)?.boolean.unwrap_or(false))
    }

    /// Concepts that `id` specializes.
    pub fn broader_concepts(&self, id: &ConceptId) -> Result<BTreeSet<ConceptId>> {
        let query = self.concept_template(BROADER_QUERY, id)?.render()?;
        let results = self.query(&query)?;
        Ok(self.collect_concepts(&results, "broader"))
    }

    /// Concepts whose broader relation points at `id`.
    pub fn narrower_concepts(&self, id: &ConceptId) -> Result<BTreeSet<ConceptId>> {
        let query = self.concept_template(NARROWER_QUERY, id)?.render()?;
        let results = self.query(&query)?;
        Ok(self.collect_concepts(&results, "narrower"))
    }

    /// Typed, named concepts reachable from the description of `id` through
    /// any domain-ontology property.
    pub fn related_concepts(&self, id: &ConceptId) -> Result<BTreeSet<ConceptId>> {
        let query = self
            .concept_template(RELATED_QUERY, id)?
            .bind_literal("domain", MDX)
            .render()?;
        let results = self.query(&query)?;
        Ok(self.collect_concepts(&results, "otherEntity"))
    }

    /// Submits a SPARQL Update.
    pub fn update(&self, update: &str) -> Result<()> {
        self.service.update(update)
    }

    /// Inserts every triple of `graph` into the remote graph with the same
    /// identifier. An empty graph is not submitted.
    pub fn insert_graph(&self, graph: &NamedGraph) -> Result<()> {
        if graph.is_empty() {
            debug!(graph = graph.identifier().as_str(), "nothing to insert");
            return Ok(());
        }
        let update = insert_data_update(graph)?;
        debug!(
            graph = graph.identifier().as_str(),
            triples = graph.len(),
            "submitting INSERT DATA"
        );
        self.update(&update)
    }

    /// Deletes every triple of the remote graph `graph`.
    pub fn clear_graph(&self, graph: &Iri) -> Result<()> {
        let update = QueryTemplate::new(CLEAR_GRAPH_UPDATE)
            .bind_iri("graph", graph.clone())
            .render()?;
        self.update(&update)
    }

    /// `true` if the remote graph holds at least one triple.
    pub fn graph_has_triples(&self, graph: &Iri) -> Result<bool> {
        let query = QueryTemplate::new(GRAPH_NONEMPTY_QUERY)
            .bind_iri("graph", graph.clone())
            .render()?;
        self.ask(&query)
    }

    fn concept_template(&self, body: &str, id: &ConceptId) -> Result<QueryTemplate> {
        Ok(QueryTemplate::new(body)
            .standard_prefixes(&["mdx"])
            .bind_iri("concept", self.concept_iri(id)?))
    }

    fn collect_concepts(&self, results: &ResultSet, var: &str) -> BTreeSet<ConceptId> {
        results
            .values(var)
            .filter_map(|value| match self.concept_id_from_iri(value) {
                Ok(id) => Some(id),
                Err(_) => {
                    debug!(value, "skipping binding outside the data namespace");
                    None
                }
            })
            .collect()
    }
}

/// Renders `INSERT DATA { GRAPH <g> { ... } }` for `graph`.
pub fn insert_data_update(graph: &NamedGraph) -> Result<String> {
    Ok(format!(
        "INSERT DATA {{\n  GRAPH {} {{\n{}  }}\n}}",
        graph.identifier(),
        graph.serialize(SerializationFormat::NTriples)?
    ))
}
