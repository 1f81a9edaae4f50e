//! Configuration for the answer service

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Retrieval backend (vector or text)
    #[serde(default)]
    pub backend: SearchBackend,
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Document store configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// LLM API configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// The LLM API key is the only mandatory variable; everything else
    /// falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(backend) = env::var("RAGRELAY_BACKEND") {
            config.backend = backend.parse()?;
        }
        if let Ok(host) = env::var("RAGRELAY_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid PORT: {}", e)))?;
        }
        if let Ok(path) = env::var("RAGRELAY_DATABASE_PATH") {
            config.database.path = PathBuf::from(path);
        }

        match env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => config.llm.api_key = key,
            _ => return Err(Error::Config("OPENAI_API_KEY is not set".to_string())),
        }
        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = env::var("RAGRELAY_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = env::var("RAGRELAY_EMBED_MODEL") {
            config.llm.embed_model = model;
        }
        if let Ok(top_k) = env::var("RAGRELAY_TOP_K") {
            config.retrieval.top_k = top_k
                .parse()
                .map_err(|e| Error::Config(format!("Invalid RAGRELAY_TOP_K: {}", e)))?;
        }

        Ok(config)
    }
}

/// Retrieval backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// In-memory vector similarity over embedded documents
    #[default]
    Vector,
    /// Database-native full-text search across every collection
    Text,
}

impl FromStr for SearchBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" => Ok(Self::Vector),
            "text" => Ok(Self::Text),
            other => Err(Error::Config(format!(
                "Unknown backend '{}', expected 'vector' or 'text'",
                other
            ))),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (the connection string)
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ragrelay.db"),
        }
    }
}

/// LLM API configuration (OpenAI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Bearer token for the API
    pub api_key: String,
    /// Chat-completion model
    pub chat_model: String,
    /// Embedding model
    pub embed_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            chat_model: "gpt-3.5-turbo".to_string(),
            embed_model: "text-embedding-ada-002".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest documents returned by the vector backend
    pub top_k: usize,
    /// Per-collection result limit for the text backend
    pub collection_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            collection_limit: 10,
        }
    }
}
