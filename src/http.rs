//! Blocking HTTP transport shared by every remote client.
//!
//! Wraps a `ureq` agent with a global timeout and a bounded retry on
//! transient transport failures (connect, timeout, I/O). HTTP status codes
//! are returned to the caller as data; they are never retried here, and
//! neither are malformed requests or protocol errors.

use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{Credentials, HttpConfig};
use crate::errors::{LinkerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl<'a> HttpRequest<'a> {
    pub fn new(method: Method, url: &'a str) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(mut self, content_type: &str, body: impl Into<String>) -> Self {
        self.headers.push(("Content-Type", content_type.to_string()));
        self.body = Some(body.into());
        self
    }

    /// Adds an `Authorization: Basic` header when credentials are present.
    pub fn basic_auth(self, credentials: Option<&Credentials>) -> Self {
        match credentials {
            Some(c) => {
                let token = STANDARD.encode(format!("{}:{}", c.username, c.password));
                self.header("Authorization", format!("Basic {}", token))
            }
            None => self,
        }
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Upper bound on the sleep between two attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Blocking client with timeout and retry policy.
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    max_retries: u32,
    backoff: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Executes `request`, retrying transport failures up to `max_retries` times.
    pub fn execute(&self, request: &HttpRequest<'_>) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            match self.execute_once(request) {
                Ok(response) => {
                    debug!(
                        method = request.method.as_str(),
                        url = request.url,
                        status = response.status,
                        "http exchange complete"
                    );
                    return Ok(response);
                }
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        method = request.method.as_str(),
                        url = request.url,
                        attempt = attempt + 1,
                        error = %e,
                        "transport failure, retrying in {:?}",
                        delay
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(LinkerError::Transport {
                        message: format!("{} (after {} attempts)", e, attempt + 1),
                        url: request.url.to_string(),
                    });
                }
            }
        }
    }

    /// Exponential backoff for the retry after `attempt`, capped at [`MAX_BACKOFF`].
    fn backoff_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.backoff.checked_mul(factor))
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }

    fn execute_once(&self, request: &HttpRequest<'_>) -> std::result::Result<HttpResponse, ureq::Error> {
        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(request.url);
                for (key, value) in &request.query {
                    builder = builder.query(*key, value.as_str());
                }
                for (name, value) in &request.headers {
                    builder = builder.header(*name, value.as_str());
                }
                builder.call()
            }
            Method::Post | Method::Patch => {
                let mut builder = if request.method == Method::Post {
                    self.agent.post(request.url)
                } else {
                    self.agent.patch(request.url)
                };
                for (key, value) in &request.query {
                    builder = builder.query(*key, value.as_str());
                }
                for (name, value) in &request.headers {
                    builder = builder.header(*name, value.as_str());
                }
                builder.send(request.body.as_deref().unwrap_or(""))
            }
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse { status, body })
    }
}

/// Failures worth another attempt: the exchange never completed.
fn is_transient(error: &ureq::Error) -> bool {
    matches!(
        error,
        ureq::Error::Io(_)
            | ureq::Error::Timeout(_)
            | ureq::Error::ConnectionFailed
            | ureq::Error::HostNotFound
    )
}
