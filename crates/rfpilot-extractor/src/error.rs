//! Error types for RFP processing

use thiserror::Error;

/// Errors that can occur while processing an RFP
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Missing or unknown RFP, or an RFP without a document
    #[error("Invalid input: {0}")]
    Input(String),

    /// The document could not be downloaded
    #[error("Document download failed: {0}")]
    Transport(String),

    /// The remote collaborator is rate-limiting requests
    #[error("AI service is rate limited, please try again later")]
    RemoteThrottled,

    /// Billing or quota exhausted on the remote collaborator
    #[error("AI service quota exhausted, please add credits")]
    RemoteQuotaExhausted,

    /// The remote call succeeded but carried no usable structured payload
    #[error("AI service returned no usable data: {0}")]
    RemoteMalformed(String),

    /// Any other remote failure
    #[error("AI service error: {0}")]
    Remote(String),

    /// Store error on a fatal path (lookup or RFP update)
    #[error("Store error: {0}")]
    Store(String),

    /// A background task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl ExtractorError {
    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractorError::RemoteThrottled)
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
