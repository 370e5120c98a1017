//! LLM-orchestrated plant selection
//!
//! The region classifier and the plant catalog are exposed as tools to an
//! OpenAI-compatible chat model. The model decides when to call them; this
//! module registers the tools, runs the tool-calling loop and validates the
//! structured answer before it is handed to the enricher.
//!
//! ```text
//! user prompt --> ChatBackend <--> ToolRegistry (region_to_season, get_edible_plants)
//!                     |
//!                     v
//!              final answer --> selection validation --> Vec<AgentPlant>
//! ```

pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod plant_agent;
pub mod tools;

pub use error::{AgentError, ToolError};
pub use llm::{ChatBackend, ChatMessage, ChatRequest, OpenAiChat, ToolCall};
pub use orchestrator::{AgentRun, Orchestrator, ToolInvocation};
pub use plant_agent::PlantAgent;
pub use tools::{Tool, ToolDefinition, ToolRegistry};
