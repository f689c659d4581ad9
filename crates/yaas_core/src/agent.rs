use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One capability invocation made by the agent during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Final prose reply; only logged by callers
    pub text: String,
    pub steps: Vec<ToolInvocation>,
}

impl AgentResponse {
    pub fn successful_calls(&self, tool: &str) -> usize {
        self.steps
            .iter()
            .filter(|step| step.tool == tool && step.success)
            .count()
    }
}

/// An LLM controller bound to the discover, fetch and save capabilities.
///
/// Which capabilities it calls, and in what order, is up to the model.
#[async_trait]
pub trait CurationAgent: Send + Sync {
    fn name(&self) -> &str;

    /// Ids of the capabilities this agent can call
    fn tool_ids(&self) -> Vec<&'static str>;

    async fn generate(&self, instruction: &str) -> Result<AgentResponse>;
}
