//! The tool-calling loop.
//!
//! Each step sends the conversation and the tool definitions to the
//! backend. Tool calls are executed in the order the model issued them and
//! their results appended as `tool` messages; a reply without tool calls
//! ends the run. Calls the model can fix (unknown tool, bad arguments,
//! missing prerequisite) are answered with an error message instead of
//! aborting.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::{AgentError, ToolError};
use super::llm::{ChatBackend, ChatMessage, ChatRequest, ToolCall};
use super::tools::ToolRegistry;

/// A tool call the orchestrator executed
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool: String,
    pub arguments: Value,
    /// Tool output, or the error text returned to the model
    pub output: Result<Value, String>,
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Text of the model's final reply
    pub answer: String,
    pub invocations: Vec<ToolInvocation>,
    pub steps: u32,
}

impl AgentRun {
    /// Successful outputs of `tool`, in call order
    pub fn outputs_of<'a>(&'a self, tool: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.invocations
            .iter()
            .filter(move |inv| inv.tool == tool)
            .filter_map(|inv| inv.output.as_ref().ok())
    }
}

pub struct Orchestrator {
    backend: Arc<dyn ChatBackend>,
    registry: ToolRegistry,
    max_steps: u32,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ChatBackend>, registry: ToolRegistry, max_steps: u32) -> Self {
        Self {
            backend,
            registry,
            max_steps,
        }
    }

    pub async fn run(&self, system: &str, user: &str) -> Result<AgentRun, AgentError> {
        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let tools = self.registry.definitions();
        let mut invocations = Vec::new();
        let mut succeeded: HashSet<String> = HashSet::new();

        for step in 1..=self.max_steps {
            let request = ChatRequest {
                messages: messages.clone(),
                tools: tools.clone(),
            };
            let reply = self.backend.complete(&request).await?;

            if reply.tool_calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                info!(steps = step, tool_calls = invocations.len(), "agent finished");
                return Ok(AgentRun {
                    answer,
                    invocations,
                    steps: step,
                });
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);

            for call in calls {
                let invocation = self.dispatch(&call, &succeeded).await?;
                let content = match &invocation.output {
                    Ok(value) => {
                        succeeded.insert(invocation.tool.clone());
                        value.to_string()
                    }
                    Err(message) => format!("error: {message}"),
                };
                messages.push(ChatMessage::tool_result(call.id, content));
                invocations.push(invocation);
            }
        }

        warn!(max_steps = self.max_steps, "agent hit the step limit");
        Err(AgentError::StepLimit(self.max_steps))
    }

    /// Run one tool call; only [`ToolError::Failed`] aborts the run.
    async fn dispatch(
        &self,
        call: &ToolCall,
        succeeded: &HashSet<String>,
    ) -> Result<ToolInvocation, AgentError> {
        let name = call.function.name.clone();
        let raw_args = if call.function.arguments.trim().is_empty() {
            "{}"
        } else {
            call.function.arguments.as_str()
        };

        let arguments: Value = match serde_json::from_str(raw_args) {
            Ok(value) => value,
            Err(e) => {
                return Ok(rejected(name, Value::Null, format!("arguments are not JSON: {e}")));
            }
        };

        let Some(tool) = self.registry.get(&name) else {
            warn!(tool = %name, "model called an unregistered tool");
            return Ok(rejected(name.clone(), arguments, format!("unknown tool '{name}'")));
        };

        if let Some(missing) = tool.requires().iter().find(|r| !succeeded.contains(**r)) {
            warn!(tool = %name, requires = missing, "tool called out of order");
            return Ok(rejected(
                name.clone(),
                arguments,
                format!("call {missing} before {name}"),
            ));
        }

        debug!(tool = %name, %arguments, "invoking tool");
        match tool.invoke(arguments.clone()).await {
            Ok(output) => Ok(ToolInvocation {
                tool: name,
                arguments,
                output: Ok(output),
            }),
            Err(ToolError::InvalidArguments(message)) => Ok(rejected(name, arguments, message)),
            Err(ToolError::Failed(message)) => Err(AgentError::Tool {
                tool: name,
                message,
            }),
        }
    }
}

fn rejected(tool: String, arguments: Value, message: String) -> ToolInvocation {
    ToolInvocation {
        tool,
        arguments,
        output: Err(message),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::agent::tools::Tool;

    /// Backend replaying a fixed list of replies and recording requests
    pub(crate) struct ScriptedBackend {
        replies: Mutex<Vec<ChatMessage>>,
        pub(crate) requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedBackend {
        pub(crate) fn new(mut replies: Vec<ChatMessage>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, request: &ChatRequest) -> Result<ChatMessage, AgentError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AgentError::Backend("script exhausted".to_owned()))
        }
    }

    pub(crate) fn calls(calls: Vec<ToolCall>) -> ChatMessage {
        ChatMessage {
            role: "assistant".to_owned(),
            content: None,
            tool_calls: calls,
            tool_call_id: None,
        }
    }

    struct Echo {
        name: &'static str,
        requires: &'static [&'static str],
        fail: bool,
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            self.name
        }
        fn description(&self) -> &'static str {
            "echo"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }
        fn requires(&self) -> &'static [&'static str] {
            self.requires
        }
        async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
            if self.fail {
                return Err(ToolError::Failed("upstream down".to_owned()));
            }
            Ok(args)
        }
    }

    fn registry(fail_second: bool) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(Echo {
                name: "first",
                requires: &[],
                fail: false,
            }))
            .unwrap();
        registry
            .register(Arc::new(Echo {
                name: "second",
                requires: &["first"],
                fail: fail_second,
            }))
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn runs_tools_and_returns_answer() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            calls(vec![ToolCall::new("c1", "first", r#"{"x":1}"#)]),
            calls(vec![ToolCall::new("c2", "second", r#"{"y":2}"#)]),
            ChatMessage::assistant("done"),
        ]));
        let orchestrator = Orchestrator::new(backend.clone(), registry(false), 5);
        let run = orchestrator.run("sys", "user").await.unwrap();

        assert_eq!(run.answer, "done");
        assert_eq!(run.steps, 3);
        assert_eq!(run.invocations.len(), 2);
        assert_eq!(run.outputs_of("second").next(), Some(&json!({"y": 2})));

        let requests = backend.requests.lock().unwrap();
        let last = requests.last().unwrap();
        let tool_msg = last.messages.last().unwrap();
        assert_eq!(tool_msg.role, "tool");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c2"));
        assert_eq!(last.tools.len(), 2);
    }

    #[tokio::test]
    async fn out_of_order_call_is_reported_back() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            calls(vec![ToolCall::new("c1", "second", "{}")]),
            ChatMessage::assistant("gave up"),
        ]));
        let orchestrator = Orchestrator::new(backend.clone(), registry(false), 5);
        let run = orchestrator.run("sys", "user").await.unwrap();

        assert_eq!(run.outputs_of("second").count(), 0);
        let err = run.invocations[0].output.as_ref().unwrap_err();
        assert!(err.contains("call first before second"));

        let requests = backend.requests.lock().unwrap();
        let feedback = requests[1].messages.last().unwrap();
        assert!(feedback.content.as_deref().unwrap().starts_with("error:"));
    }

    #[tokio::test]
    async fn unknown_tool_and_bad_json_are_reported_back() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            calls(vec![
                ToolCall::new("c1", "delete_everything", "{}"),
                ToolCall::new("c2", "first", "{not json"),
            ]),
            ChatMessage::assistant("ok"),
        ]));
        let orchestrator = Orchestrator::new(backend, registry(false), 5);
        let run = orchestrator.run("sys", "user").await.unwrap();
        assert!(run.invocations.iter().all(|inv| inv.output.is_err()));
    }

    #[tokio::test]
    async fn fatal_tool_error_aborts() {
        let backend = Arc::new(ScriptedBackend::new(vec![calls(vec![
            ToolCall::new("c1", "first", "{}"),
            ToolCall::new("c2", "second", "{}"),
        ])]));
        let orchestrator = Orchestrator::new(backend, registry(true), 5);
        let err = orchestrator.run("sys", "user").await.unwrap_err();
        assert!(matches!(err, AgentError::Tool { .. }));
    }

    #[tokio::test]
    async fn step_limit() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            calls(vec![ToolCall::new("c1", "first", "{}")]),
            calls(vec![ToolCall::new("c2", "first", "{}")]),
        ]));
        let orchestrator = Orchestrator::new(backend, registry(false), 2);
        let err = orchestrator.run("sys", "user").await.unwrap_err();
        assert!(matches!(err, AgentError::StepLimit(2)));
    }
}
