//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, database path,
//! blob root, the AI gateway and extraction tuning. The gateway credential
//! can also come from the environment.

use rfpilot_extractor::ExtractorConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the AI gateway credential
pub const API_KEY_ENV: &str = "RFPILOT_AI_API_KEY";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field has an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory uploaded documents are read from
    #[serde(default = "default_blob_root")]
    pub blob_root: String,

    /// AI gateway settings
    pub llm: LlmConfig,

    /// Extraction tuning
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// AI gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Gateway base URL (e.g., "https://ai.gateway.example")
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Bearer credential; overridden by `RFPILOT_AI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

fn default_database_path() -> String {
    "rfpilot.db".to_string()
}

fn default_blob_root() -> String {
    "uploads".to_string()
}

fn default_model() -> String {
    rfpilot_llm::gateway::DEFAULT_MODEL.to_string()
}

/// Default request timeout: 2 minutes
fn default_timeout() -> u64 {
    rfpilot_llm::gateway::DEFAULT_TIMEOUT_SECS
}

impl ServerConfig {
    /// Load configuration from a TOML file, applying the environment credential
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, std::env::var(API_KEY_ENV).ok())
    }

    /// Parse configuration text; a non-empty `env_api_key` wins over the file
    pub fn parse(contents: &str, env_api_key: Option<String>) -> Result<Self, ConfigError> {
        let mut config: ServerConfig = toml::from_str(contents)?;

        if let Some(key) = env_api_key.filter(|k| !k.trim().is_empty()) {
            config.llm.api_key = Some(key);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.endpoint".to_string()));
        }
        if self.api_key().is_none() {
            return Err(ConfigError::MissingField(format!(
                "llm.api_key (or {} environment variable)",
                API_KEY_ENV
            )));
        }
        self.extractor.validate().map_err(ConfigError::Invalid)
    }

    /// The gateway credential, if set
    pub fn api_key(&self) -> Option<&str> {
        self.llm
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfpilot_extractor::RemoteFailurePolicy;

    const MINIMAL: &str = r#"
        [llm]
        endpoint = "https://ai.gateway.example"
    "#;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::parse(MINIMAL, Some("env-key".to_string())).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.database_path, "rfpilot.db");
        assert_eq!(config.blob_root, "uploads");
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.extractor, ExtractorConfig::default());
        assert_eq!(config.api_key(), Some("env-key"));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = ServerConfig::parse(MINIMAL, None);
        assert!(matches!(result, Err(ConfigError::MissingField(_))));

        let result = ServerConfig::parse(MINIMAL, Some("   ".to_string()));
        assert!(matches!(result, Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_env_key_overrides_file() {
        let toml = r#"
            [llm]
            endpoint = "https://ai.gateway.example"
            api_key = "file-key"
        "#;

        let config = ServerConfig::parse(toml, None).unwrap();
        assert_eq!(config.api_key(), Some("file-key"));

        let config = ServerConfig::parse(toml, Some("env-key".to_string())).unwrap();
        assert_eq!(config.api_key(), Some("env-key"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/rfpilot/rfpilot.db"
            blob_root = "/var/lib/rfpilot/uploads"

            [llm]
            endpoint = "https://ai.gateway.example"
            model = "openai/gpt-4o-mini"
            timeout_secs = 30
            api_key = "file-key"

            [extractor]
            max_requirements = 20
            remote_failure_policy = "pattern_only"
        "#;

        let config = ServerConfig::parse(toml, None).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.llm.model, "openai/gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.extractor.max_requirements, 20);
        assert_eq!(
            config.extractor.remote_failure_policy,
            RemoteFailurePolicy::PatternOnly
        );
    }

    #[test]
    fn test_invalid_extractor_section() {
        let toml = r#"
            [llm]
            endpoint = "https://ai.gateway.example"
            api_key = "file-key"

            [extractor]
            min_requirement_len = 900
        "#;

        let result = ServerConfig::parse(toml, None);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
