use tracing::debug;

use crate::config::{Credentials, HttpConfig, TriplestoreConfig};
use crate::errors::{LinkerError, Result};
use crate::http::{HttpClient, HttpRequest, Method};

use super::results::ResultSet;

/// Media type used for SPARQL Update bodies by the update endpoint.
pub const SPARQL_UPDATE_CONTENT_TYPE: &str = "application/sparql-query";

/// Media type requested for query results.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Transport to a triplestore.
///
/// Implementations either return a complete result or an error, never a
/// partial result.
pub trait SparqlService {
    /// Runs a SELECT or ASK query.
    fn query(&self, query: &str) -> Result<ResultSet>;

    /// Runs a SPARQL Update. Success means the store answered `204 No Content`.
    fn update(&self, update: &str) -> Result<()>;
}

impl<T: SparqlService + ?Sized> SparqlService for &T {
    fn query(&self, query: &str) -> Result<ResultSet> {
        (**self).query(query)
    }

    fn update(&self, update: &str) -> Result<()> {
        (**self).update(update)
    }
}

/// [`SparqlService`] over the SPARQL 1.1 HTTP protocol.
pub struct HttpSparqlService {
    http: HttpClient,
    query_endpoint: String,
    update_endpoint: String,
    credentials: Option<Credentials>,
}

impl HttpSparqlService {
    pub fn new(config: &TriplestoreConfig, http: &HttpConfig) -> Self {
        Self {
            http: HttpClient::new(http),
            query_endpoint: config.query_endpoint.clone(),
            update_endpoint: config.update_endpoint.clone(),
            credentials: config.credentials.clone(),
        }
    }
}

impl SparqlService for HttpSparqlService {
    fn query(&self, query: &str) -> Result<ResultSet> {
        let request = HttpRequest::new(Method::Get, &self.query_endpoint)
            .query("query", query)
            .header("Accept", SPARQL_RESULTS_JSON)
            .basic_auth(self.credentials.as_ref());

        let response = self
            .http
            .execute(&request)
            .map_err(|e| LinkerError::QueryExecution {
                message: e.to_string(),
                query: query.to_string(),
            })?;

        if !response.is_success() {
            return Err(LinkerError::QueryExecution {
                message: format!("endpoint answered with status {}", response.status),
                query: query.to_string(),
            });
        }

        response
            .json::<ResultSet>()
            .map_err(|e| LinkerError::QueryExecution {
                message: format!("malformed result document: {}", e),
                query: query.to_string(),
            })
    }

    fn update(&self, update: &str) -> Result<()> {
        let request = HttpRequest::new(Method::Patch, &self.update_endpoint)
            .body(SPARQL_UPDATE_CONTENT_TYPE, update)
            .basic_auth(self.credentials.as_ref());

        let response = self.http.execute(&request)?;
        if response.status != 204 {
            return Err(LinkerError::UpdateFailed {
                status: response.status,
                body: response.body,
            });
        }
        debug!(bytes = update.len(), "update accepted");
        Ok(())
    }
}
