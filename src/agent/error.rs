use thiserror::Error;

use crate::ForageError;

/// Errors from the agent tool-calling loop
#[derive(Error, Debug)]
pub enum AgentError {
    /// The chat completions endpoint failed or answered something unusable
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// The final answer is not the expected `{"plants": [...]}` structure
    #[error("malformed agent output: {0}")]
    MalformedOutput(String),

    /// The final answer names a plant no tool call returned
    #[error("agent returned a plant the catalog did not offer: {0}")]
    UnknownPlant(String),

    /// The agent answered without calling a required tool
    #[error("agent never called {0}")]
    MissingToolCall(String),

    /// A tool was called for another region, date, climate or season than the request
    #[error("agent answered from the wrong lookup: {0}")]
    ArgumentMismatch(String),

    /// No final answer within the step budget
    #[error("no final answer after {0} steps")]
    StepLimit(u32),

    /// A tool failed in a way the model cannot correct
    #[error("tool {tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("tool {0} is registered twice")]
    DuplicateTool(String),
}

/// Tool failure kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Reported back to the model so it can retry with corrected arguments
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Aborts the agent run
    #[error("{0}")]
    Failed(String),
}

impl From<AgentError> for ForageError {
    /// Backend and tool failure details are logged, never returned to the client.
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Tool { tool, message } => {
                tracing::warn!(tool = %tool, error = %message, "agent tool failed");
                ForageError::agent(format!("tool {tool} failed"))
            }
            AgentError::Backend(message) => {
                tracing::warn!(error = %message, "LLM backend failed");
                ForageError::agent("LLM backend unavailable")
            }
            other => ForageError::agent(other.to_string()),
        }
    }
}
