use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{EmbeddingConfig, HttpConfig};
use crate::errors::{LinkerError, Result};
use crate::http::{HttpClient, HttpRequest, Method};
use crate::types::ConceptId;

use super::FallbackSearch;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    entity: serde_json::Map<String, Value>,
}

/// Client for the vector-similarity search service.
pub struct EmbeddingSearchClient {
    http: HttpClient,
    url: String,
    id_field: String,
}

impl EmbeddingSearchClient {
    pub fn new(config: &EmbeddingConfig, http: &HttpConfig) -> Self {
        Self {
            http: HttpClient::new(http),
            url: config.url.clone(),
            id_field: config.id_field.clone(),
        }
    }

    /// Nearest concept for the given query strings.
    ///
    /// Each string is sent as its own `query` parameter, in order, with
    /// `limit=1`. Any non-2xx status becomes [`LinkerError::EmbeddingSearch`]
    /// carrying that status.
    pub fn search(&self, queries: &[String]) -> Result<ConceptId> {
        let query_label = queries.join(" | ");
        let mut request = HttpRequest::new(Method::Get, &self.url);
        for q in queries {
            request = request.query("query", q.as_str());
        }
        let request = request
            .query("limit", "1")
            .header("Accept", "application/json");

        let response = self.http.execute(&request)?;
        if !response.is_success() {
            return Err(LinkerError::EmbeddingSearch {
                status: response.status,
                query: query_label,
            });
        }

        let parsed: SearchResponse = response.json()?;
        let id = parsed
            .results
            .first()
            .and_then(|hit| extract_id(&hit.entity, &self.id_field))
            .ok_or_else(|| LinkerError::EmbeddingNoMatch {
                query: query_label.clone(),
            })?;
        debug!(query = %query_label, concept = id.as_str(), "embedding match");
        Ok(id)
    }
}

/// Reads the identifier field, accepting string or numeric JSON values.
fn extract_id(entity: &serde_json::Map<String, Value>, field: &str) -> Option<ConceptId> {
    let raw = match entity.get(field)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    ConceptId::new(raw).ok()
}

impl FallbackSearch for EmbeddingSearchClient {
    fn search(&self, normalized_forms: &[String]) -> Result<ConceptId> {
        EmbeddingSearchClient::search(self, normalized_forms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_id_string_and_number() {
        let entity = json!({"sctid": "12345"});
        assert_eq!(
            extract_id(entity.as_object().unwrap(), "sctid").unwrap().as_str(),
            "12345"
        );
        let entity = json!({"sctid": 22298006});
        assert_eq!(
            extract_id(entity.as_object().unwrap(), "sctid").unwrap().as_str(),
            "22298006"
        );
        let entity = json!({"other": "1"});
        assert!(extract_id(entity.as_object().unwrap(), "sctid").is_none());
    }
}
