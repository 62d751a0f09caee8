//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SHOPSEARCH_*` environment
//! variables. Only the OpenAI API key is required.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::time::Duration;

/// Default Qdrant URL used when `SHOPSEARCH_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SHOPSEARCH_*` overrides on top of
/// defaults, then [`Config::validate`] before wiring anything up.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Qdrant API key, when the endpoint requires one.
    pub qdrant_api_key: Option<String>,

    /// Collection holding variant points. Default: `product_variants`.
    pub collection_name: String,

    /// Embedding dimensionality. Default: `1536`.
    pub vector_size: u64,

    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,

    /// API key for the chat and embedding endpoints. Required.
    pub openai_api_key: String,

    /// Chat model used for intent parsing and variant generation.
    pub chat_model: String,

    /// Embedding model name.
    pub embedding_model: String,

    /// Token cap per chat completion. Default: `1000`.
    pub max_tokens: u32,

    /// Per-call HTTP timeout in seconds. Default: `30`.
    pub timeout_secs: u64,

    /// Hard cap on search results per query. Default: `20`.
    pub max_results: u64,

    /// Score above which a hit is a "high semantic match". Default: `0.9`.
    pub high_score: f32,

    /// Score above which a hit is a "good semantic match". Default: `0.7`.
    pub good_score: f32,

    /// Texts per embedding request. Default: `100`.
    pub embed_batch_size: usize,

    /// Pause between embedding batches, in milliseconds. Default: `100`.
    pub embed_batch_delay_ms: u64,

    /// Variants generated per product create or regenerate. Default: `5`.
    pub variant_count: i32,

    /// Variants generated per product during batch import. Default: `3`.
    pub batch_variant_count: i32,

    /// Override for the variant generation prompt template.
    pub prompt_template: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_api_key: None,
            collection_name: crate::store::DEFAULT_COLLECTION_NAME.to_string(),
            vector_size: crate::store::DEFAULT_VECTOR_SIZE,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_api_key: String::new(),
            chat_model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            max_tokens: 1000,
            timeout_secs: 30,
            max_results: crate::pipeline::DEFAULT_MAX_RESULTS,
            high_score: crate::search::DEFAULT_HIGH_SCORE,
            good_score: crate::search::DEFAULT_GOOD_SCORE,
            embed_batch_size: crate::embedding::DEFAULT_BATCH_SIZE,
            embed_batch_delay_ms: 100,
            variant_count: crate::pipeline::DEFAULT_VARIANT_COUNT,
            batch_variant_count: crate::pipeline::BATCH_VARIANT_COUNT,
            prompt_template: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "SHOPSEARCH_PORT";
    const ENV_BIND_ADDR: &'static str = "SHOPSEARCH_BIND_ADDR";
    const ENV_QDRANT_URL: &'static str = "SHOPSEARCH_QDRANT_URL";
    const ENV_QDRANT_API_KEY: &'static str = "SHOPSEARCH_QDRANT_API_KEY";
    const ENV_COLLECTION_NAME: &'static str = "SHOPSEARCH_COLLECTION_NAME";
    const ENV_VECTOR_SIZE: &'static str = "SHOPSEARCH_VECTOR_SIZE";
    const ENV_OPENAI_BASE_URL: &'static str = "SHOPSEARCH_OPENAI_BASE_URL";
    const ENV_OPENAI_API_KEY: &'static str = "SHOPSEARCH_OPENAI_API_KEY";
    const ENV_CHAT_MODEL: &'static str = "SHOPSEARCH_CHAT_MODEL";
    const ENV_EMBEDDING_MODEL: &'static str = "SHOPSEARCH_EMBEDDING_MODEL";
    const ENV_MAX_TOKENS: &'static str = "SHOPSEARCH_MAX_TOKENS";
    const ENV_TIMEOUT_SECS: &'static str = "SHOPSEARCH_TIMEOUT_SECS";
    const ENV_MAX_RESULTS: &'static str = "SHOPSEARCH_MAX_RESULTS";
    const ENV_HIGH_SCORE: &'static str = "SHOPSEARCH_HIGH_SCORE";
    const ENV_GOOD_SCORE: &'static str = "SHOPSEARCH_GOOD_SCORE";
    const ENV_EMBED_BATCH_SIZE: &'static str = "SHOPSEARCH_EMBED_BATCH_SIZE";
    const ENV_EMBED_BATCH_DELAY_MS: &'static str = "SHOPSEARCH_EMBED_BATCH_DELAY_MS";
    const ENV_VARIANT_COUNT: &'static str = "SHOPSEARCH_VARIANT_COUNT";
    const ENV_BATCH_VARIANT_COUNT: &'static str = "SHOPSEARCH_BATCH_VARIANT_COUNT";
    const ENV_PROMPT_TEMPLATE: &'static str = "SHOPSEARCH_PROMPT_TEMPLATE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;

        Ok(Self {
            port,
            bind_addr,
            qdrant_url: Self::string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            qdrant_api_key: Self::optional_string_from_env(Self::ENV_QDRANT_API_KEY),
            collection_name: Self::string_from_env(
                Self::ENV_COLLECTION_NAME,
                defaults.collection_name,
            ),
            vector_size: Self::number_from_env(Self::ENV_VECTOR_SIZE, defaults.vector_size),
            openai_base_url: Self::string_from_env(
                Self::ENV_OPENAI_BASE_URL,
                defaults.openai_base_url,
            ),
            openai_api_key: Self::string_from_env(Self::ENV_OPENAI_API_KEY, defaults.openai_api_key),
            chat_model: Self::string_from_env(Self::ENV_CHAT_MODEL, defaults.chat_model),
            embedding_model: Self::string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            max_tokens: Self::number_from_env(Self::ENV_MAX_TOKENS, defaults.max_tokens),
            timeout_secs: Self::number_from_env(Self::ENV_TIMEOUT_SECS, defaults.timeout_secs),
            max_results: Self::number_from_env(Self::ENV_MAX_RESULTS, defaults.max_results),
            high_score: Self::number_from_env(Self::ENV_HIGH_SCORE, defaults.high_score),
            good_score: Self::number_from_env(Self::ENV_GOOD_SCORE, defaults.good_score),
            embed_batch_size: Self::number_from_env(
                Self::ENV_EMBED_BATCH_SIZE,
                defaults.embed_batch_size,
            ),
            embed_batch_delay_ms: Self::number_from_env(
                Self::ENV_EMBED_BATCH_DELAY_MS,
                defaults.embed_batch_delay_ms,
            ),
            variant_count: Self::number_from_env(Self::ENV_VARIANT_COUNT, defaults.variant_count),
            batch_variant_count: Self::number_from_env(
                Self::ENV_BATCH_VARIANT_COUNT,
                defaults.batch_variant_count,
            ),
            prompt_template: Self::optional_string_from_env(Self::ENV_PROMPT_TEMPLATE),
        })
    }

    /// Checks basic invariants (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_OPENAI_API_KEY,
            });
        }

        if !(0.0 < self.good_score && self.good_score < self.high_score && self.high_score <= 1.0) {
            return Err(ConfigError::InvalidThresholds {
                good: self.good_score,
                high: self.high_score,
            });
        }

        if self.vector_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_VECTOR_SIZE,
                value: self.vector_size.to_string(),
            });
        }

        if self.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_RESULTS,
                value: self.max_results.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Per-call HTTP timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause between embedding batches as a [`Duration`].
    pub fn embed_batch_delay(&self) -> Duration {
        Duration::from_millis(self.embed_batch_delay_ms)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn number_from_env<T: std::str::FromStr>(var_name: &str, default: T) -> T {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
