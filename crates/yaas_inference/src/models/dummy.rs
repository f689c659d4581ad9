use serde_json::json;
use std::fmt;
use yaas_core::tools::NEWS_SCRAPER;
use yaas_core::Result;

use super::{ChatMessage, ChatModel, Role, ToolCall, ToolSpec};

/// Offline stand-in for a real model.
///
/// Calls the news scraper once if it is available, then replies with a
/// plain-text note. Nothing is ever saved.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChatModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage> {
        let results: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .filter_map(|m| m.content.as_deref())
            .collect();

        let can_discover = tools.iter().any(|tool| tool.name == NEWS_SCRAPER);
        if results.is_empty() && can_discover {
            return Ok(ChatMessage::tool_calls(vec![ToolCall::new(
                "dummy-1",
                NEWS_SCRAPER,
                json!({}),
            )]));
        }

        let found = results
            .first()
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
            .and_then(|value| value["totalFound"].as_u64())
            .unwrap_or(0);
        Ok(ChatMessage::assistant(format!(
            "Dummy curation run: {} candidate articles found, none written.",
            found
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper_spec() -> ToolSpec {
        ToolSpec {
            name: NEWS_SCRAPER.to_string(),
            description: String::new(),
            parameters: json!({}),
        }
    }

    #[tokio::test]
    async fn test_dummy_model_discovers_then_answers() {
        let model = DummyModel::new();
        let mut messages = vec![ChatMessage::user("curate")];

        let first = model.complete(&messages, &[scraper_spec()]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);
        assert_eq!(first.tool_calls[0].function.name, NEWS_SCRAPER);

        messages.push(first);
        messages.push(ChatMessage::tool_result("dummy-1", r#"{"articles":[],"totalFound":4}"#));
        let second = model.complete(&messages, &[scraper_spec()]).await.unwrap();
        assert!(second.tool_calls.is_empty());
        assert_eq!(
            second.content.as_deref(),
            Some("Dummy curation run: 4 candidate articles found, none written.")
        );
    }

    #[tokio::test]
    async fn test_dummy_model_without_tools_answers_directly() {
        let model = DummyModel::new();
        let reply = model.complete(&[ChatMessage::user("hello")], &[]).await.unwrap();
        assert!(reply.tool_calls.is_empty());
        assert!(reply.content.is_some());
    }
}
