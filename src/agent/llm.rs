//! Chat completions backend with function tools.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint over
//! `reqwest`. The orchestrator only sees [`ChatBackend`], so tests can
//! script the model's replies.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::AgentError;
use super::tools::ToolDefinition;
use crate::config::AgentConfig;

/// One message of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as the API sends them
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_owned()
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text("assistant", content)
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_owned(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_owned(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Everything a backend needs for one completion
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// A chat model that may answer with text or with tool calls.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatMessage, AgentError>;
}

/// Backend for OpenAI-compatible chat completions APIs.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::Backend("LLM API key is not configured".to_owned()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| AgentError::Backend(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatMessage, AgentError> {
        let url = format!("{}/chat/completions", self.api_url);

        let tools: Vec<serde_json::Value> = request
            .tools
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();

        let body = serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "tools": tools,
            "temperature": 0.0,
        });

        debug!(messages = request.messages.len(), "calling chat completions");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Backend(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(AgentError::Backend(format!(
                "chat completions returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AgentError::Backend(format!("response parse failed: {e}")))?;

        extract_message(&json)
    }
}

/// Extract `choices[0].message` from a chat completions response.
fn extract_message(json: &serde_json::Value) -> Result<ChatMessage, AgentError> {
    let message = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| {
            AgentError::Backend("response missing choices[0].message".to_owned())
        })?;

    serde_json::from_value(message.clone())
        .map_err(|e| AgentError::Backend(format!("unexpected message shape: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_message() {
        let json = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "{\"plants\": []}"}
            }]
        });
        let message = extract_message(&json).unwrap();
        assert_eq!(message.role, "assistant");
        assert_eq!(message.content.as_deref(), Some("{\"plants\": []}"));
        assert!(message.tool_calls.is_empty());
    }

    #[test]
    fn extract_tool_call_message() {
        let json = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "region_to_season",
                            "arguments": "{\"region\":\"Kerala\",\"date\":\"2024-04-15\"}"
                        }
                    }]
                }
            }]
        });
        let message = extract_message(&json).unwrap();
        assert!(message.content.is_none());
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].function.name, "region_to_season");
    }

    #[test]
    fn extract_missing_choices() {
        let json = serde_json::json!({"error": "overloaded"});
        assert!(matches!(extract_message(&json), Err(AgentError::Backend(_))));
    }

    #[test]
    fn tool_result_serializes_call_id() {
        let message = ChatMessage::tool_result("call_9", "[]");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_9");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn new_requires_api_key() {
        assert!(OpenAiChat::new(&AgentConfig::default()).is_err());
    }
}
