use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, enabled, info, warn, Level};

use crate::config::LinkerConfig;
use crate::errors::Result;
use crate::identity::{assignment_id, format_score, slugify};
use crate::rdf::vocab::{jdg, mdx, rdf, rdfs, top, xsd};
use crate::rdf::{
    iri, lang_literal, GraphStore, Iri, Literal, NamedGraph, SerializationFormat,
};
use crate::sparql::{KgClient, SparqlService};
use crate::types::ConceptId;

/// Provenance nodes minted for one judged concept.
///
/// Every IRI is a pure function of its inputs: the assignment IRI of
/// `(case, concept, score)`, the relevance and value IRIs of the score alone,
/// and the agent IRI of the method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceAssignment {
    pub iri: Iri,
    pub concept: ConceptId,
    pub concept_iri: Iri,
    pub case: Iri,
    pub case_reference: String,
    pub score: String,
    pub relevance_node: Iri,
    pub value_node: Iri,
    pub agent: Option<Agent>,
}

/// The judge that produced an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub iri: Iri,
    pub name: String,
}

impl RelevanceAssignment {
    /// Mints the nodes for `concept` judged relevant to `case_reference`.
    ///
    /// A relative case reference is resolved against `data_namespace`; the
    /// digest is always taken over the reference exactly as given.
    pub fn new(
        data_namespace: &str,
        case_reference: &str,
        concept: &ConceptId,
        relevance: f64,
        method: &str,
    ) -> Result<Self> {
        let score = format_score(relevance)?;
        let id = assignment_id(case_reference, concept.as_str(), &score);

        let case = if case_reference.contains(':') {
            iri(case_reference)?
        } else {
            iri(format!("{}{}", data_namespace, case_reference))?
        };

        let agent = if method.is_empty() {
            None
        } else {
            Some(Agent {
                iri: iri(format!("{}agent/{}", data_namespace, slugify(method)))?,
                name: method.to_string(),
            })
        };

        Ok(Self {
            iri: iri(format!("{}relevanceassignment/{}", data_namespace, id))?,
            concept: concept.clone(),
            concept_iri: iri(format!("{}{}", data_namespace, concept))?,
            case,
            case_reference: case_reference.to_string(),
            relevance_node: relevance_node_iri(data_namespace, &score)?,
            value_node: iri(format!("{}value/{}", data_namespace, score))?,
            score,
            agent,
        })
    }

    /// Writes the assignment's triples into `graph`.
    pub fn add_to(&self, graph: &mut NamedGraph) {
        let a = &self.iri;
        graph.insert(a, rdf::type_(), jdg::relevance_assignment());
        graph.insert(
            a,
            rdfs::label(),
            lang_literal(
                format!(
                    "Relevance assignment to SNOMED concept {} for clinical case {} with relevance {}",
                    self.concept, self.case_reference, self.score
                ),
                "en",
            ),
        );
        graph.insert(a, jdg::is_judgement_on(), self.concept_iri.clone());
        graph.insert(a, mdx::for_clinical_case(), self.case.clone());
        graph.insert(a, jdg::has_relevance(), self.relevance_node.clone());

        let r = &self.relevance_node;
        graph.insert(r, rdf::type_(), jdg::relevance());
        graph.insert(
            r,
            rdfs::label(),
            lang_literal(format!("Relevance {}", self.score), "en"),
        );
        graph.insert(r, top::has_value(), self.value_node.clone());

        let v = &self.value_node;
        graph.insert(v, rdf::type_(), top::value_class());
        graph.insert(
            v,
            rdfs::label(),
            lang_literal(format!("Value {}", self.score), "en"),
        );
        graph.insert(
            v,
            top::value(),
            Literal::new_typed_literal(self.score.clone(), xsd::decimal()),
        );

        if let Some(agent) = &self.agent {
            graph.insert(&agent.iri, rdf::type_(), top::agent());
            graph.insert(&agent.iri, rdfs::label(), lang_literal(agent.name.clone(), "en"));
            graph.insert(a, mdx::has_judge(), agent.iri.clone());
        }
    }
}

/// IRI of the node shared by every assignment with score `score`.
pub fn relevance_node_iri(data_namespace: &str, score: &str) -> Result<Iri> {
    iri(format!("{}relevance/{}", data_namespace, score))
}

/// What a write submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelevanceWriteSummary {
    pub assignments: Vec<String>,
    pub triple_count: usize,
}

/// Persists relevance judgements as provenance triples in the relevance graph.
pub struct RelevanceAnnotator<'a, S: SparqlService> {
    client: &'a KgClient<S>,
    relevance_graph: Iri,
}

impl<'a, S: SparqlService> RelevanceAnnotator<'a, S> {
    pub fn new(client: &'a KgClient<S>, relevance_graph: Iri) -> Self {
        Self {
            client,
            relevance_graph,
        }
    }

    /// Annotator writing to the relevance graph named in `config`.
    pub fn from_config(client: &'a KgClient<S>, config: &LinkerConfig) -> Result<Self> {
        Ok(Self::new(
            client,
            iri(config.namespaces.relevance_graph.clone())?,
        ))
    }

    pub fn relevance_graph(&self) -> &Iri {
        &self.relevance_graph
    }

    /// Builds the relevance graph for one judgement batch without submitting it.
    ///
    /// Blank concept ids are dropped and duplicates collapse.
    pub fn build(
        &self,
        case_reference: &str,
        concept_ids: &[impl AsRef<str>],
        relevance: f64,
        method: &str,
    ) -> Result<(GraphStore, Vec<RelevanceAssignment>)> {
        let concepts = concept_ids
            .iter()
            .map(|id| id.as_ref().trim())
            .filter(|id| !id.is_empty())
            .map(ConceptId::new)
            .collect::<Result<BTreeSet<_>>>()?;

        let mut store = GraphStore::new();
        let mut assignments = Vec::with_capacity(concepts.len());
        let graph = store.create_named_graph(&self.relevance_graph);
        for concept in &concepts {
            let assignment = RelevanceAssignment::new(
                self.client.data_namespace(),
                case_reference,
                concept,
                relevance,
                method,
            )?;
            assignment.add_to(graph);
            assignments.push(assignment);
        }
        Ok((store, assignments))
    }

    /// Records that `concept_ids` were judged relevant to the case with score
    /// `relevance` by `method`, and submits the triples as one INSERT.
    ///
    /// `entity_mention` only appears in logs.
    pub fn write_relevance(
        &self,
        case_reference: &str,
        entity_mention: &str,
        concept_ids: &[impl AsRef<str>],
        relevance: f64,
        method: &str,
    ) -> Result<RelevanceWriteSummary> {
        let (store, assignments) = self.build(case_reference, concept_ids, relevance, method)?;

        let summary = RelevanceWriteSummary {
            assignments: assignments.iter().map(|a| a.iri.as_str().to_string()).collect(),
            triple_count: store.len(),
        };

        let Some(graph) = store.named_graph(&self.relevance_graph) else {
            return Ok(summary);
        };
        if graph.is_empty() {
            debug!(case = case_reference, mention = entity_mention, "no concepts to annotate");
            return Ok(summary);
        }

        if enabled!(Level::DEBUG) {
            debug!("relevance graph:\n{}", graph.serialize(SerializationFormat::Turtle)?);
        }
        self.client.insert_graph(graph)?;

        info!(
            case = case_reference,
            mention = entity_mention,
            assignments = summary.assignments.len(),
            triples = summary.triple_count,
            "relevance assignments written"
        );
        Ok(summary)
    }

    /// Removes every triple from the remote relevance graph. Irreversible.
    pub fn clear_relevance_graph(&self) -> Result<()> {
        warn!(graph = self.relevance_graph.as_str(), "clearing relevance graph");
        self.client.clear_graph(&self.relevance_graph)
    }
}
