//! RFPilot LLM Provider Layer
//!
//! Pluggable text-generation providers behind the `LlmProvider` trait from
//! `rfpilot-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GatewayProvider`: OpenAI-compatible chat completions gateway
//!
//! # Examples
//!
//! ```
//! use rfpilot_llm::MockProvider;
//! use rfpilot_domain::traits::LlmProvider;
//! use rfpilot_domain::{Completion, CompletionRequest};
//!
//! let provider = MockProvider::free_text("Hello from LLM!");
//! let reply = provider.complete(&CompletionRequest::new("system", "user")).unwrap();
//! assert_eq!(reply, Completion::FreeText("Hello from LLM!".to_string()));
//! ```

#![warn(missing_docs)]

pub mod gateway;

use rfpilot_domain::traits::{LlmProvider, ProviderError, ProviderErrorKind};
use rfpilot_domain::{Completion, CompletionRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gateway::GatewayProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The call went through but the reply carried nothing usable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Billing or quota exhausted (HTTP 402)
    #[error("Payment required: quota exhausted")]
    QuotaExhausted,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl ProviderError for LlmError {
    fn kind(&self) -> ProviderErrorKind {
        match self {
            LlmError::RateLimitExceeded => ProviderErrorKind::Throttled,
            LlmError::QuotaExhausted => ProviderErrorKind::QuotaExhausted,
            LlmError::InvalidResponse(_) => ProviderErrorKind::Malformed,
            LlmError::Communication(_)
            | LlmError::ModelNotAvailable(_)
            | LlmError::Other(_) => ProviderErrorKind::Other,
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// Returns queued replies first, then the default reply, without making any
/// network calls. Every request is recorded.
///
/// # Examples
///
/// ```
/// use rfpilot_llm::{LlmError, MockProvider};
/// use rfpilot_domain::traits::LlmProvider;
/// use rfpilot_domain::CompletionRequest;
///
/// let provider = MockProvider::structured(r#"{"client_name": "Acme"}"#);
/// provider.push_reply(Err(LlmError::RateLimitExceeded));
///
/// let request = CompletionRequest::new("system", "user");
/// assert!(provider.complete(&request).is_err());
/// assert!(provider.complete(&request).is_ok());
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: Result<Completion, LlmError>,
    queued: Arc<Mutex<VecDeque<Result<Completion, LlmError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a mock that always answers with the given reply
    pub fn new(reply: Result<Completion, LlmError>) -> Self {
        Self {
            default_reply: reply,
            queued: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with tool-call arguments
    pub fn structured(arguments: impl Into<String>) -> Self {
        Self::new(Ok(Completion::Structured(arguments.into())))
    }

    /// Always answer with plain text
    pub fn free_text(content: impl Into<String>) -> Self {
        Self::new(Ok(Completion::FreeText(content.into())))
    }

    /// Always fail with the given error
    pub fn failing(error: LlmError) -> Self {
        Self::new(Err(error))
    }

    /// Queue a reply to be returned before the default one
    pub fn push_reply(&self, reply: Result<Completion, LlmError>) {
        self.queued.lock().unwrap().push_back(reply);
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::free_text("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<Completion, Self::Error> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(reply) = self.queued.lock().unwrap().pop_front() {
            return reply;
        }

        self.default_reply.clone()
    }
}
