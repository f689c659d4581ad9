pub mod agent;
pub mod error;
pub mod storage;
pub mod tools;
pub mod types;

pub use agent::{AgentResponse, CurationAgent, ToolInvocation};
pub use error::{Error, Result};
pub use storage::ArticleStorage;
pub use tools::Tool;
pub use types::{Article, Candidate, FetchedContent, NewArticle};
