//! Tool-calling loop that lets a chat model drive the curation capabilities.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use yaas_core::{AgentResponse, CurationAgent, Result, Tool, ToolInvocation};

use crate::models::{ChatMessage, ChatModel, ToolCall, ToolSpec};
use crate::prompts::{AGENT_INSTRUCTIONS, AGENT_NAME};

pub const DEFAULT_MAX_STEPS: usize = 10;

pub struct ToolAgent {
    name: String,
    instructions: String,
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    max_steps: usize,
}

impl ToolAgent {
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            name: AGENT_NAME.to_string(),
            instructions: AGENT_INSTRUCTIONS.to_string(),
            model,
            tools,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Upper bound on model turns per `generate` call.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| ToolSpec::from_tool(tool.as_ref())).collect()
    }

    /// Runs one requested call. Unknown tools and unreadable arguments are
    /// reported back to the model rather than aborting the run.
    async fn invoke(&self, call: &ToolCall) -> Value {
        let name = call.function.name.as_str();
        let Some(tool) = self.tools.iter().find(|tool| tool.id() == name) else {
            warn!(tool = name, "Model requested an unknown tool");
            return json!({ "success": false, "error": format!("Unknown tool: {}", name) });
        };

        let raw = call.function.arguments.trim();
        let input = if raw.is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(raw) {
                Ok(input) => input,
                Err(e) => {
                    warn!(tool = name, error = %e, "Model sent malformed tool arguments");
                    return json!({ "success": false, "error": format!("Invalid arguments: {}", e) });
                }
            }
        };

        debug!(tool = name, "Invoking tool");
        tool.call(input).await
    }
}

/// Capabilities without a `success` flag (the news scraper) always count
/// as successful.
fn reported_success(output: &Value) -> bool {
    output.get("success").and_then(Value::as_bool).unwrap_or(true)
}

#[async_trait]
impl CurationAgent for ToolAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn tool_ids(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.id()).collect()
    }

    async fn generate(&self, instruction: &str) -> Result<AgentResponse> {
        let specs = self.specs();
        let mut messages = vec![
            ChatMessage::system(self.instructions.clone()),
            ChatMessage::user(instruction),
        ];
        let mut steps = Vec::new();
        let mut last_text = String::new();

        for step in 1..=self.max_steps {
            let reply = self.model.complete(&messages, &specs).await?;
            if let Some(text) = reply.content.as_deref().filter(|t| !t.trim().is_empty()) {
                last_text = text.to_string();
            }

            if reply.tool_calls.is_empty() {
                info!(steps = step, tool_calls = steps.len(), "Agent finished");
                return Ok(AgentResponse { text: last_text, steps });
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                let output = self.invoke(call).await;
                let success = reported_success(&output);
                info!(step, tool = %call.function.name, success, "Tool call completed");
                steps.push(ToolInvocation {
                    tool: call.function.name.clone(),
                    success,
                });
                messages.push(ChatMessage::tool_result(call.id.clone(), output.to_string()));
            }
        }

        warn!(max_steps = self.max_steps, "Agent stopped at step limit");
        Ok(AgentResponse { text: last_text, steps })
    }
}
