//! Remote extraction through a text-generation provider

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_extraction_with;
use crate::prompt::PromptBuilder;
use crate::types::ExtractionResult;
use rfpilot_domain::traits::{LlmProvider, ProviderError, ProviderErrorKind};
use rfpilot_domain::Completion;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a remote extraction produced no record
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteFailure {
    /// The provider is rate-limiting (HTTP 429)
    Throttled,

    /// Billing or quota exhausted (HTTP 402)
    QuotaExhausted,

    /// The call went through but carried no usable structured payload
    Malformed(String),

    /// Any other failure, including transport errors
    Other(String),
}

/// What the remote collaborator answered
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteReply {
    /// A parsed structured payload
    Structured(ExtractionResult),

    /// Plain text instead of a tool call
    FreeText(String),

    /// The call failed
    Failure(RemoteFailure),
}

impl RemoteReply {
    /// Reduce the reply to a record or a failure
    ///
    /// Free text is accepted only when it parses as an extraction payload.
    pub fn into_result(self, config: &ExtractorConfig) -> Result<ExtractionResult, RemoteFailure> {
        match self {
            RemoteReply::Structured(result) => Ok(result),
            RemoteReply::FreeText(text) => parse_extraction_with(&text, config).map_err(|e| {
                RemoteFailure::Malformed(format!("Free-text reply is not extraction data: {}", e))
            }),
            RemoteReply::Failure(failure) => Err(failure),
        }
    }
}

impl From<RemoteFailure> for ExtractorError {
    fn from(failure: RemoteFailure) -> Self {
        match failure {
            RemoteFailure::Throttled => ExtractorError::RemoteThrottled,
            RemoteFailure::QuotaExhausted => ExtractorError::RemoteQuotaExhausted,
            RemoteFailure::Malformed(msg) => ExtractorError::RemoteMalformed(msg),
            RemoteFailure::Other(msg) => ExtractorError::Remote(msg),
        }
    }
}

/// Classify a provider error
pub fn classify_provider_error<E: ProviderError>(error: &E) -> RemoteFailure {
    match error.kind() {
        ProviderErrorKind::Throttled => RemoteFailure::Throttled,
        ProviderErrorKind::QuotaExhausted => RemoteFailure::QuotaExhausted,
        ProviderErrorKind::Malformed => RemoteFailure::Malformed(error.to_string()),
        ProviderErrorKind::Other => RemoteFailure::Other(error.to_string()),
    }
}

/// Sends document text to the provider and asks for a structured record
///
/// Blocking; run it on a blocking thread. Makes exactly one call, never
/// retries and persists nothing.
pub struct RemoteExtractor<L> {
    provider: Arc<L>,
    config: ExtractorConfig,
}

impl<L> Clone for RemoteExtractor<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}

impl<L: LlmProvider> RemoteExtractor<L> {
    /// Create a remote extractor sharing `provider`
    pub fn new(provider: Arc<L>, config: &ExtractorConfig) -> Self {
        Self {
            provider,
            config: config.clone(),
        }
    }

    /// Run one extraction round-trip
    pub fn extract(&self, text: &str) -> RemoteReply {
        let builder = PromptBuilder::new(text, self.config.max_remote_chars);
        let sent_chars = builder.document_text().chars().count();
        if sent_chars < text.chars().count() {
            info!("Document text capped to {} characters for remote extraction", sent_chars);
        }

        let request = builder.build();
        debug!("Requesting remote extraction ({} chars)", sent_chars);

        match self.provider.complete(&request) {
            Ok(Completion::Structured(arguments)) => match parse_extraction_with(&arguments, &self.config) {
                Ok(result) => RemoteReply::Structured(result),
                Err(e) => {
                    warn!("Remote tool call carried unusable arguments: {}", e);
                    RemoteReply::Failure(RemoteFailure::Malformed(e.to_string()))
                }
            },
            Ok(Completion::FreeText(text)) => {
                debug!("Remote collaborator answered with free text");
                RemoteReply::FreeText(text)
            }
            Err(e) => {
                let failure = classify_provider_error(&e);
                warn!("Remote extraction failed: {}", e);
                RemoteReply::Failure(failure)
            }
        }
    }
}
