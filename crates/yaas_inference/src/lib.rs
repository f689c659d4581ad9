pub mod agent;
pub mod models;
pub mod prompts;
pub mod workflow;

pub use agent::ToolAgent;
pub use models::{create_model, ChatModel};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    /// Base URL of an OpenAI-compatible API
    pub model_url: Option<String>,
}

pub mod prelude {
    pub use super::agent::ToolAgent;
    pub use super::models::{create_model, ChatModel};
    pub use super::workflow::{default_backfill_plan, run_backfill, run_curation, BackfillYear};
    pub use super::Config;
    pub use yaas_core::{CurationAgent, Error, Result};
}
