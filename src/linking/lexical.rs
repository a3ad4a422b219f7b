use tracing::{debug, warn};

use crate::errors::Result;
use crate::rdf::vocab::BIF;
use crate::sparql::{KgClient, Param, QueryTemplate, SparqlService};
use crate::types::ConceptId;

use super::ConceptLinker;

const NAME_MATCH_QUERY: &str = "
SELECT DISTINCT ?concept
WHERE {
  ?concept naming:hasNaming/naming:hasName ?theName .
  ?theName ?property ?name .
  FILTER (?property IN (mi:normForm, naming:lexicalItem))
  FILTER (LCASE(STR(?name)) = %{name})
}";

const NAME_MATCH_QUERY_FREE_TEXT: &str = "
SELECT DISTINCT ?concept
WHERE {
  ?concept naming:hasNaming/naming:hasName ?theName .
  ?theName ?property ?name .
  ?name bif:contains %{phrase} .
  FILTER (?property IN (mi:normForm, naming:lexicalItem))
  FILTER (LCASE(STR(?name)) = %{name})
}";

/// Exact, case-insensitive name lookup against the knowledge graph.
///
/// Several concepts can share a normalized name; the lexicographically
/// smallest identifier is returned so repeated lookups agree.
pub struct LexicalLinker<'a, S: SparqlService> {
    client: &'a KgClient<S>,
    full_text_prefilter: bool,
}

impl<'a, S: SparqlService> LexicalLinker<'a, S> {
    /// Creates a linker. With `full_text_prefilter`, candidate names are first
    /// narrowed through the store's `bif:contains` text index.
    pub fn new(client: &'a KgClient<S>, full_text_prefilter: bool) -> Self {
        Self {
            client,
            full_text_prefilter,
        }
    }

    /// Every concept whose normalized name equals `normalized_form`.
    pub fn candidates(&self, normalized_form: &str) -> Result<Vec<ConceptId>> {
        let name = normalized_form.trim().to_lowercase();
        let template = if self.full_text_prefilter {
            QueryTemplate::new(NAME_MATCH_QUERY_FREE_TEXT)
                .prefix("bif", BIF)
                .bind("phrase", Param::FreeTextPhrase(name.clone()))
        } else {
            QueryTemplate::new(NAME_MATCH_QUERY)
        };
        let query = template
            .standard_prefixes(&["naming", "mi"])
            .bind_literal("name", name)
            .render()?;

        let results = self.client.query(&query)?;
        let mut ids: Vec<ConceptId> = results
            .values("concept")
            .filter_map(|value| self.client.concept_id_from_iri(value).ok())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

impl<S: SparqlService> ConceptLinker for LexicalLinker<'_, S> {
    fn link(&self, normalized_form: &str) -> Option<ConceptId> {
        if normalized_form.trim().is_empty() {
            return None;
        }
        match self.candidates(normalized_form) {
            Ok(ids) => {
                if ids.len() > 1 {
                    debug!(
                        form = normalized_form,
                        candidates = ids.len(),
                        "ambiguous name, taking smallest id"
                    );
                }
                ids.into_iter().next()
            }
            Err(e) => {
                warn!(form = normalized_form, error = %e, "lexical lookup failed, treating as miss");
                None
            }
        }
    }
}
