use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LinkerError, Result};

/// Name of the configuration file stored inside the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Name of the directory (under the platform config dir) holding the config.
pub const CONFIG_DIR: &str = "concept-linker";

/// Environment variable overriding the triplestore user name.
pub const ENV_SPARQL_USER: &str = "CONCEPT_LINKER_SPARQL_USER";

/// Environment variable overriding the triplestore password.
pub const ENV_SPARQL_PASSWORD: &str = "CONCEPT_LINKER_SPARQL_PASSWORD";

/// Basic-auth credentials for a remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Triplestore endpoints and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriplestoreConfig {
    /// SPARQL endpoint used for SELECT and ASK queries.
    pub query_endpoint: String,
    /// Endpoint accepting SPARQL Update requests.
    pub update_endpoint: String,
    /// Optional basic-auth credentials, sent with both reads and updates.
    pub credentials: Option<Credentials>,
    /// Pre-filter lexical lookups with the Virtuoso `bif:contains` index.
    pub full_text_prefilter: bool,
}

impl Default for TriplestoreConfig {
    fn default() -> Self {
        Self {
            query_endpoint: "http://localhost:8890/sparql".to_string(),
            update_endpoint: "http://localhost:8890/DAV/home/mdx/add-to-graph".to_string(),
            credentials: None,
            full_text_prefilter: true,
        }
    }
}

/// Text normalization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub url: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6666/normalizer/normalize".to_string(),
        }
    }
}

/// Embedding / vector-search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub url: String,
    /// Field of `results[0].entity` holding the concept identifier.
    pub id_field: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4321/search".to_string(),
            id_field: "sctid".to_string(),
        }
    }
}

/// IRIs used to mint concept and provenance resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Namespace concept identifiers are appended to.
    pub data: String,
    /// Named graph receiving relevance assignments.
    pub relevance_graph: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            data: crate::rdf::vocab::MDXD.to_string(),
            relevance_graph: format!("{}graph/relevance", crate::rdf::vocab::MDXD),
        }
    }
}

/// Timeout and retry policy applied to every outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Global per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure. Status errors are not retried.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

/// Configuration for the concept linker.
///
/// Every remote endpoint and credential lives here and is handed to the
/// clients at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    pub triplestore: TriplestoreConfig,
    pub normalizer: NormalizerConfig,
    pub embedding: EmbeddingConfig,
    pub namespaces: NamespaceConfig,
    pub http: HttpConfig,
}

impl LinkerConfig {
    /// Fills triplestore credentials from the environment when both
    /// variables are set.
    pub fn apply_env_overrides(&mut self) {
        if let (Ok(username), Ok(password)) = (
            std::env::var(ENV_SPARQL_USER),
            std::env::var(ENV_SPARQL_PASSWORD),
        ) {
            self.triplestore.credentials = Some(Credentials { username, password });
        }
    }
}

/// Returns the default configuration path, `<config dir>/concept-linker/config.toml`.
///
/// Falls back to the current directory when the platform has no config dir.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// If the file does not exist, returns the default configuration.
pub fn load_config(path: &Path) -> Result<LinkerConfig> {
    if !path.exists() {
        return Ok(LinkerConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| LinkerError::Config {
        message: format!("failed to read config file '{}': {}", path.display(), e),
    })?;

    let config: LinkerConfig = toml::from_str(&contents).map_err(|e| LinkerError::Config {
        message: format!("failed to parse config file '{}': {}", path.display(), e),
    })?;

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it into place.
pub fn save_config(path: &Path, config: &LinkerConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| LinkerError::Config {
                message: format!(
                    "failed to create config directory '{}': {}",
                    parent.display(),
                    e
                ),
            })?;
        }
    }

    let tmp_path = path.with_extension("tmp");

    let text = toml::to_string_pretty(config).map_err(|e| LinkerError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &text).map_err(|e| LinkerError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| LinkerError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            path.display(),
            e
        ),
    })?;

    Ok(())
}
