use std::fmt;

use thiserror::Error;

/// Pipeline stage reached when a term failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStage {
    Normalization,
    Lexical,
    Embedding,
}

impl ResolutionStage {
    /// Returns the string representation of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStage::Normalization => "normalization",
            ResolutionStage::Lexical => "lexical",
            ResolutionStage::Embedding => "embedding",
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while resolving terms or writing annotations.
#[derive(Error, Debug)]
pub enum LinkerError {
    #[error("normalization error: {message} (term: {term})")]
    Normalization { message: String, term: String },

    #[error("normalizer returned no forms for term '{term}'")]
    NoNormalization { term: String },

    #[error("embedding search failed with status {status} (query: {query})")]
    EmbeddingSearch { status: u16, query: String },

    #[error("embedding search returned no results (query: {query})")]
    EmbeddingNoMatch { query: String },

    #[error("query execution error: {message} (query: {query})")]
    QueryExecution { message: String, query: String },

    #[error("update failed - status code {status}")]
    UpdateFailed { status: u16, body: String },

    #[error("transport error: {message} (url: {url})")]
    Transport { message: String, url: String },

    #[error("could not resolve '{term}' at {stage} stage: {source}")]
    Resolution {
        term: String,
        stage: ResolutionStage,
        #[source]
        source: Box<LinkerError>,
    },

    #[error("invalid query input: {message}")]
    InvalidTerm { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LinkerError {
    /// HTTP status carried by this error, looking through resolution wrappers.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LinkerError::EmbeddingSearch { status, .. } => Some(*status),
            LinkerError::UpdateFailed { status, .. } => Some(*status),
            LinkerError::Resolution { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Stage at which a resolution failed, if this is a resolution error.
    pub fn stage(&self) -> Option<ResolutionStage> {
        match self {
            LinkerError::Resolution { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Convenience alias for results using `LinkerError`.
pub type Result<T> = std::result::Result<T, LinkerError>;
