/// Term-to-concept resolution.
///
/// A term is normalized, each normalized form is linked lexically against
/// the knowledge graph, and when the primary form does not link the whole
/// form list is handed to a semantic-embedding search.
mod embedding;
mod lexical;
mod matcher;
mod normalizer;

pub use embedding::EmbeddingSearchClient;
pub use lexical::LexicalLinker;
pub use matcher::{http_matcher, ConceptMatcher, HttpConceptMatcher};
pub use normalizer::HttpNormalizer;

use crate::errors::Result;
use crate::types::ConceptId;

/// Produces the ordered normalized forms of a raw term.
pub trait Normalizer {
    fn normalize(&self, term: &str) -> Result<Vec<String>>;
}

/// Links one normalized form to a concept.
///
/// Any failure is a miss: implementations return `None` rather than an error.
pub trait ConceptLinker {
    fn link(&self, normalized_form: &str) -> Option<ConceptId>;
}

/// Best-effort resolution used when lexical linking misses.
pub trait FallbackSearch {
    fn search(&self, normalized_forms: &[String]) -> Result<ConceptId>;
}

impl<T: Normalizer + ?Sized> Normalizer for &T {
    fn normalize(&self, term: &str) -> Result<Vec<String>> {
        (**self).normalize(term)
    }
}

impl<T: ConceptLinker + ?Sized> ConceptLinker for &T {
    fn link(&self, normalized_form: &str) -> Option<ConceptId> {
        (**self).link(normalized_form)
    }
}

impl<T: FallbackSearch + ?Sized> FallbackSearch for &T {
    fn search(&self, normalized_forms: &[String]) -> Result<ConceptId> {
        (**self).search(normalized_forms)
    }
}
