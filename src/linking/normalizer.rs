use serde::Serialize;
use tracing::debug;

use crate::config::{HttpConfig, NormalizerConfig};
use crate::errors::{LinkerError, Result};
use crate::http::{HttpClient, HttpRequest, Method};

use super::Normalizer;

#[derive(Serialize)]
struct NormalizeRequest<'a> {
    text: &'a str,
}

/// Client for the text normalization service.
pub struct HttpNormalizer {
    http: HttpClient,
    url: String,
}

impl HttpNormalizer {
    pub fn new(config: &NormalizerConfig, http: &HttpConfig) -> Self {
        Self {
            http: HttpClient::new(http),
            url: config.url.clone(),
        }
    }
}

impl Normalizer for HttpNormalizer {
    fn normalize(&self, term: &str) -> Result<Vec<String>> {
        let body = serde_json::to_string(&NormalizeRequest { text: term })?;
        let request = HttpRequest::new(Method::Post, &self.url)
            .query("keepOrder", "true")
            .header("Accept", "application/json")
            .body("application/json", body);

        let response = self.http.execute(&request).map_err(|e| LinkerError::Normalization {
            message: e.to_string(),
            term: term.to_string(),
        })?;

        if !response.is_success() {
            return Err(LinkerError::Normalization {
                message: format!("normalizer answered with status {}", response.status),
                term: term.to_string(),
            });
        }

        let forms: Vec<String> = response.json().map_err(|e| LinkerError::Normalization {
            message: format!("malformed normalizer response: {}", e),
            term: term.to_string(),
        })?;
        debug!(term, forms = ?forms, "normalized");
        Ok(forms)
    }
}
