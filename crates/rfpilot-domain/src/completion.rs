//! Request and reply shapes for the text-generation collaborator

/// A function the model is asked to call with schema-constrained arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Function name (e.g. "extract_rfp_data")
    pub name: String,

    /// What the function is for
    pub description: String,

    /// JSON schema of the arguments, serialized
    pub parameters: String,
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,

    /// User instruction
    pub user: String,

    /// When set, the provider forces a call to this tool
    pub tool: Option<ToolSpec>,
}

impl CompletionRequest {
    /// Create a freeform request
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            tool: None,
        }
    }

    /// Force the reply through a tool call
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tool = Some(tool);
        self
    }
}

/// What the provider answered
///
/// Depending on the request and the model, the answer is either the
/// arguments of a tool call or plain text. Callers must handle both.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Raw JSON arguments of the requested tool call
    Structured(String),

    /// Plain message content
    FreeText(String),
}

impl Completion {
    /// The raw text of either variant
    pub fn as_text(&self) -> &str {
        match self {
            Completion::Structured(s) | Completion::FreeText(s) => s,
        }
    }
}
