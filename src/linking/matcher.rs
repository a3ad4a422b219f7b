use tracing::{debug, info};

use crate::config::LinkerConfig;
use crate::errors::{LinkerError, ResolutionStage, Result};
use crate::sparql::{HttpSparqlService, KgClient};
use crate::types::*;

use super::{
    ConceptLinker, EmbeddingSearchClient, FallbackSearch, HttpNormalizer, LexicalLinker,
    Normalizer,
};

/// Matcher wired to the HTTP services.
pub type HttpConceptMatcher<'a> =
    ConceptMatcher<HttpNormalizer, LexicalLinker<'a, HttpSparqlService>, EmbeddingSearchClient>;

/// Builds a matcher over the services in `config`, linking through `client`.
pub fn http_matcher<'a>(
    config: &LinkerConfig,
    client: &'a KgClient<HttpSparqlService>,
) -> HttpConceptMatcher<'a> {
    ConceptMatcher::new(
        HttpNormalizer::new(&config.normalizer, &config.http),
        LexicalLinker::new(client, config.triplestore.full_text_prefilter),
        EmbeddingSearchClient::new(&config.embedding, &config.http),
    )
}

/// Resolves raw terms to concept identifiers.
///
/// Strategies are tried in order:
/// 1. **Lexical** -- every normalized form is linked against the knowledge
///    graph. If the primary form links, the linked ids are the answer.
/// 2. **Embedding** -- otherwise the full, ordered list of normalized forms
///    goes to the similarity search and its single best hit is the answer.
pub struct ConceptMatcher<N, L, F> {
    normalizer: N,
    linker: L,
    fallback: F,
}

impl<N, L, F> ConceptMatcher<N, L, F>
where
    N: Normalizer,
    L: ConceptLinker,
    F: FallbackSearch,
{
    pub fn new(normalizer: N, linker: L, fallback: F) -> Self {
        Self {
            normalizer,
            linker,
            fallback,
        }
    }

    /// Resolves a single term.
    ///
    /// Normalization and fallback failures are returned wrapped in
    /// [`LinkerError::Resolution`] with the term and the stage reached. A
    /// term with no normalized forms fails with
    /// [`LinkerError::NoNormalization`] before any lookup is made.
    pub fn resolve(&self, term: &str) -> Result<Resolution> {
        let forms = self
            .normalizer
            .normalize(term)
            .map_err(|e| wrap(term, ResolutionStage::Normalization, e))?;

        if forms.is_empty() {
            return Err(wrap(
                term,
                ResolutionStage::Normalization,
                LinkerError::NoNormalization {
                    term: term.to_string(),
                },
            ));
        }

        let candidates = self.candidates(&forms);
        if candidates.primary_linked() {
            debug!(term, candidates = candidates.len(), "lexical match");
            return Ok(Resolution {
                term: term.to_string(),
                normalized_forms: forms,
                concepts: candidates.concepts(),
                stage: ResolutionStage::Lexical,
            });
        }

        debug!(term, forms = ?forms, "no lexical match for primary form, trying embedding search");
        let concept = self
            .fallback
            .search(&forms)
            .map_err(|e| wrap(term, ResolutionStage::Embedding, e))?;

        Ok(Resolution {
            term: term.to_string(),
            normalized_forms: forms,
            concepts: std::iter::once(concept).collect(),
            stage: ResolutionStage::Embedding,
        })
    }

    /// Lexical link outcome of every form, deduplicated.
    pub fn candidates(&self, forms: &[String]) -> CandidateSet {
        forms.iter().map(|form| self.linker.link(form)).collect()
    }

    /// Resolves a batch of terms. A failing term is recorded and does not
    /// stop the batch.
    pub fn resolve_all<T: AsRef<str>>(&self, terms: &[T]) -> ResolutionSummary {
        let total = terms.len();
        let mut resolved = Vec::new();
        let mut failed = Vec::new();

        for term in terms {
            let term = term.as_ref();
            match self.resolve(term) {
                Ok(r) => resolved.push(r),
                Err(e) => failed.push(FailedResolution {
                    term: term.to_string(),
                    error: e.to_string(),
                }),
            }
        }

        let resolved_count = resolved.len();
        info!(total, resolved = resolved_count, "batch resolution complete");

        ResolutionSummary {
            resolved,
            failed,
            total,
            resolved_count,
        }
    }
}

fn wrap(term: &str, stage: ResolutionStage, source: LinkerError) -> LinkerError {
    LinkerError::Resolution {
        term: term.to_string(),
        stage,
        source: Box::new(source),
    }
}
