use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{LinkerError, ResolutionStage, Result};

/// Canonical ontology concept identifier, e.g. a SNOMED CT code.
///
/// Restricted to ASCII alphanumerics plus `-`, `_` and `.`, so that it can be
/// appended to a namespace and embedded in a query as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConceptId(String);

impl ConceptId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(LinkerError::InvalidTerm {
                message: "concept id must not be empty".to_string(),
            });
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(LinkerError::InvalidTerm {
                message: format!("concept id '{}' contains invalid characters", value),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConceptId {
    type Error = LinkerError;

    fn try_from(value: String) -> Result<Self> {
        ConceptId::new(value)
    }
}

impl From<ConceptId> for String {
    fn from(id: ConceptId) -> Self {
        id.0
    }
}

/// Lexical link outcomes for every normalized form of a term.
///
/// Deduplicated, keeping the position of each value's first occurrence, so
/// the first element is always the outcome for the primary normalized form.
/// `None` marks a form that did not link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    entries: Vec<Option<ConceptId>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an outcome unless an equal one is already present.
    pub fn insert(&mut self, candidate: Option<ConceptId>) -> bool {
        if self.entries.contains(&candidate) {
            return false;
        }
        self.entries.push(candidate);
        true
    }

    pub fn first(&self) -> Option<&Option<ConceptId>> {
        self.entries.first()
    }

    /// `true` when the primary normalized form linked to a concept.
    pub fn primary_linked(&self) -> bool {
        matches!(self.first(), Some(Some(_)))
    }

    /// Linked concept ids, without absent markers.
    pub fn concepts(&self) -> BTreeSet<ConceptId> {
        self.entries.iter().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<ConceptId>> {
        self.entries.iter()
    }
}

impl FromIterator<Option<ConceptId>> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Option<ConceptId>>>(iter: I) -> Self {
        let mut set = CandidateSet::new();
        for candidate in iter {
            set.insert(candidate);
        }
        set
    }
}

/// Outcome of resolving one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub term: String,
    pub normalized_forms: Vec<String>,
    pub concepts: BTreeSet<ConceptId>,
    /// Stage that produced `concepts`: lexical or embedding.
    #[serde(serialize_with = "serialize_stage")]
    pub stage: ResolutionStage,
}

fn serialize_stage<S: serde::Serializer>(
    stage: &ResolutionStage,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(stage.as_str())
}

/// A term that could not be resolved, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedResolution {
    pub term: String,
    pub error: String,
}

/// Summary of resolving a batch of terms.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionSummary {
    pub resolved: Vec<Resolution>,
    pub failed: Vec<FailedResolution>,
    pub total: usize,
    pub resolved_count: usize,
}

impl ResolutionSummary {
    /// Every distinct concept id across the resolved terms.
    pub fn all_concepts(&self) -> BTreeSet<ConceptId> {
        self.resolved
            .iter()
            .flat_map(|r| r.concepts.iter().cloned())
            .collect()
    }

    /// Terms that resolved through the embedding fallback.
    pub fn fallback_terms(&self) -> HashSet<&str> {
        self.resolved
            .iter()
            .filter(|r| r.stage == ResolutionStage::Embedding)
            .map(|r| r.term.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ConceptId {
        ConceptId::new(s).unwrap()
    }

    #[test]
    fn test_concept_id_validation() {
        assert!(ConceptId::new("22298006").is_ok());
        assert!(ConceptId::new("").is_err());
        assert!(ConceptId::new("123> ?s ?p ?o").is_err());
    }

    #[test]
    fn test_candidate_set_keeps_first_occurrence_order() {
        let set: CandidateSet = vec![None, Some(id("1")), None, Some(id("1")), Some(id("2"))]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.first(), Some(&None));
        assert!(!set.primary_linked());
        assert_eq!(set.concepts().len(), 2);
    }

    #[test]
    fn test_candidate_set_primary_linked() {
        let set: CandidateSet = vec![Some(id("1")), None].into_iter().collect();
        assert!(set.primary_linked());
        assert_eq!(set.concepts().into_iter().collect::<Vec<_>>(), vec![id("1")]);
    }
}
