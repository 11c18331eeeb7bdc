//! Configuration for RFP processing

use serde::{Deserialize, Serialize};

/// What to do when the remote extraction fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteFailurePolicy {
    /// Fail the whole invocation; pattern output is never substituted
    #[default]
    FailLoud,

    /// Continue with the pattern extractor's output alone
    PatternOnly,
}

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Characters of document text sent to the remote collaborator
    pub max_remote_chars: usize,

    /// Minimum requirement length (characters, after whitespace collapsing)
    pub min_requirement_len: usize,

    /// Maximum requirement length (characters, after whitespace collapsing)
    pub max_requirement_len: usize,

    /// Maximum number of requirements kept by the pattern extractor
    pub max_requirements: usize,

    /// How far past a budget match to look for a magnitude suffix (characters)
    pub magnitude_window: usize,

    /// Behavior on remote extraction failure
    pub remote_failure_policy: RemoteFailurePolicy,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_remote_chars == 0 {
            return Err("max_remote_chars must be greater than 0".to_string());
        }
        if self.min_requirement_len == 0 {
            return Err("min_requirement_len must be greater than 0".to_string());
        }
        if self.min_requirement_len > self.max_requirement_len {
            return Err("min_requirement_len cannot exceed max_requirement_len".to_string());
        }
        if self.max_requirements == 0 {
            return Err("max_requirements must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration: 15..=800 character requirements, at most 30
    fn default() -> Self {
        Self {
            max_remote_chars: 100_000,
            min_requirement_len: 15,
            max_requirement_len: 800,
            max_requirements: 30,
            magnitude_window: 12,
            remote_failure_policy: RemoteFailurePolicy::FailLoud,
        }
    }
}

impl ExtractorConfig {
    /// Compact preset: shorter requirements and a smaller cap
    pub fn compact() -> Self {
        Self {
            min_requirement_len: 11,
            max_requirement_len: 499,
            max_requirements: 20,
            ..Self::default()
        }
    }

    /// Use a different remote failure policy
    pub fn with_remote_failure_policy(mut self, policy: RemoteFailurePolicy) -> Self {
        self.remote_failure_policy = policy;
        self
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
