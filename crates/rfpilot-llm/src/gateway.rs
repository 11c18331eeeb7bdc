//! Chat Completions Gateway Provider
//!
//! Talks to an OpenAI-compatible `/v1/chat/completions` endpoint.
//!
//! # Features
//!
//! - Bearer-token authentication
//! - Forced tool calls for schema-constrained replies
//! - HTTP status classification (429 throttled, 402 quota exhausted)
//!
//! There is no retry logic here: throttling and quota failures are surfaced
//! to the caller as they are.
//!
//! # Examples
//!
//! ```no_run
//! use rfpilot_llm::GatewayProvider;
//!
//! let provider = GatewayProvider::new("https://ai.gateway.example", "secret-key")
//!     .unwrap()
//!     .with_model("google/gemini-2.5-flash");
//! ```

use crate::LlmError;
use rfpilot_domain::traits::LlmProvider;
use rfpilot_domain::{Completion, CompletionRequest, ToolSpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default model requested from the gateway
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Default timeout for completion requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Chat completions gateway provider
#[derive(Debug, Clone)]
pub struct GatewayProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ToolDefinition<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDefinition<'a>,
}

#[derive(Serialize)]
struct FunctionDefinition<'a> {
    name: &'a str,
    description: &'a str,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolChoiceFunction<'a>,
}

#[derive(Serialize)]
struct ToolChoiceFunction<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    arguments: String,
}

impl GatewayProvider {
    /// Create a new gateway provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Gateway base URL (without `/v1/chat/completions`)
    /// - `api_key`: Bearer credential
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            client: build_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Result<Self, LlmError> {
        self.client = build_client(timeout_secs)?;
        Ok(self)
    }

    /// The model requested from the gateway
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one completion request
    ///
    /// # Errors
    ///
    /// - `RateLimitExceeded` on HTTP 429
    /// - `QuotaExhausted` on HTTP 402
    /// - `ModelNotAvailable` on HTTP 404
    /// - `Communication` on transport failures and any other non-success status
    /// - `InvalidResponse` when the body has neither a tool call nor content
    pub async fn send(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let parameters = match &request.tool {
            Some(tool) => Some(tool_parameters(tool)?),
            None => None,
        };

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            tools: request.tool.as_ref().zip(parameters).map(|(tool, parameters)| {
                vec![ToolDefinition {
                    kind: "function",
                    function: FunctionDefinition {
                        name: &tool.name,
                        description: &tool.description,
                        parameters,
                    },
                }]
            }),
            tool_choice: request.tool.as_ref().map(|tool| ToolChoice {
                kind: "function",
                function: ToolChoiceFunction { name: &tool.name },
            }),
        };

        debug!(
            "Sending completion request to {} (model {}, user prompt {} chars)",
            url,
            self.model,
            request.user.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
                reqwest::StatusCode::PAYMENT_REQUIRED => LlmError::QuotaExhausted,
                reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
                _ => {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    warn!("Gateway returned HTTP {}: {}", status, error_text);
                    LlmError::Communication(format!("HTTP {}: {}", status, error_text))
                }
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        completion_from_response(parsed)
    }
}

impl LlmProvider for GatewayProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<Completion, Self::Error> {
        // Blocking wrapper for the async call; callers run this on a blocking thread
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to create runtime: {}", e)))?;

        runtime.block_on(self.send(request))
    }
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    // Pooled connections would be bound to the runtime of the call that opened them
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))
}

fn tool_parameters(tool: &ToolSpec) -> Result<serde_json::Value, LlmError> {
    serde_json::from_str(&tool.parameters)
        .map_err(|e| LlmError::Other(format!("Invalid schema for tool '{}': {}", tool.name, e)))
}

fn completion_from_response(response: ChatResponse) -> Result<Completion, LlmError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;

    if let Some(call) = message.tool_calls.and_then(|calls| calls.into_iter().next()) {
        return Ok(Completion::Structured(call.function.arguments));
    }

    match message.content {
        Some(content) if !content.trim().is_empty() => Ok(Completion::FreeText(content)),
        _ => Err(LlmError::InvalidResponse(
            "Response has neither a tool call nor content".to_string(),
        )),
    }
}
