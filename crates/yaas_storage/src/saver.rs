//! The `article-saver` capability.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use yaas_core::tools::{self, parse_input, parse_published_at, SaveInput, SaveOutput, ARTICLE_SAVER};
use yaas_core::{ArticleStorage, Error, NewArticle, Tool};

const DUPLICATE_MESSAGE: &str = "Article already exists in database";

pub struct ArticleSaver {
    storage: Arc<dyn ArticleStorage>,
}

impl ArticleSaver {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self { storage }
    }

    /// Skips articles whose source URL is already stored.
    ///
    /// The existence check and the insert are separate queries, so two
    /// concurrent saves of one URL can both succeed unless the store was
    /// initialized with a unique `source_url` index.
    pub async fn save(&self, input: SaveInput) -> SaveOutput {
        info!(title = %input.title, source = %input.source_name, "Saving article");

        match self.storage.exists(&input.source_url).await {
            Ok(true) => {
                info!(url = %input.source_url, "Article already exists, skipping");
                return SaveOutput {
                    success: false,
                    article_id: None,
                    message: DUPLICATE_MESSAGE.to_string(),
                };
            }
            Ok(false) => {}
            Err(e) => {
                error!(error = %e, "Existence check failed");
                return failure(&e);
            }
        }

        let published_at = match input.published_at.as_deref() {
            Some(raw) => parse_published_at(raw).unwrap_or_else(|| {
                warn!(published_at = raw, "Unparseable publishedAt, using current time");
                Utc::now()
            }),
            None => Utc::now(),
        };

        let article = NewArticle {
            title: input.title,
            content: input.content,
            summary: input.summary,
            source_name: input.source_name,
            source_url: input.source_url,
            published_at,
            image_url: input.image_url.filter(|url| !url.trim().is_empty()),
        };

        match self.storage.save(&article).await {
            Ok(saved) => {
                info!(article_id = saved.id, "Article saved");
                SaveOutput {
                    success: true,
                    article_id: Some(saved.id),
                    message: format!("Article saved with ID {}", saved.id),
                }
            }
            Err(Error::DuplicateArticle(url)) => {
                info!(%url, "Article inserted concurrently, skipping");
                SaveOutput {
                    success: false,
                    article_id: None,
                    message: DUPLICATE_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to save article");
                failure(&e)
            }
        }
    }
}

fn failure(err: &Error) -> SaveOutput {
    SaveOutput {
        success: false,
        article_id: None,
        message: format!("Error: {}", err),
    }
}

#[async_trait]
impl Tool for ArticleSaver {
    fn id(&self) -> &'static str {
        ARTICLE_SAVER
    }

    fn description(&self) -> &'static str {
        "Saves a curated article to the database with proper source attribution"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "description": "The article title" },
                "content": { "type": "string", "description": "The full article content" },
                "summary": { "type": "string", "description": "A brief summary of the article" },
                "sourceName": { "type": "string", "description": "The name of the news source" },
                "sourceUrl": { "type": "string", "description": "The URL of the original article" },
                "imageUrl": { "type": "string", "description": "Optional image URL" },
                "publishedAt": {
                    "type": "string",
                    "description": "Optional publication date (YYYY-MM-DD or RFC 3339); defaults to now"
                }
            },
            "required": ["title", "content", "summary", "sourceName", "sourceUrl"]
        })
    }

    async fn call(&self, input: Value) -> Value {
        let output = match parse_input::<SaveInput>(input) {
            Ok(input) => self.save(input).await,
            Err(e) => {
                warn!(error = %e, "Rejected article-saver input");
                failure(&e)
            }
        };
        tools::to_value(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStorage;
    use chrono::Datelike;

    fn input(url: &str) -> SaveInput {
        SaveInput {
            title: "Kenyan agritech founder wins award".to_string(),
            content: "Long form article body.".to_string(),
            summary: "A founder is recognised.".to_string(),
            source_name: "BBC Africa".to_string(),
            source_url: url.to_string(),
            image_url: None,
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_save_then_duplicate() {
        let storage = Arc::new(InMemoryStorage::new());
        let saver = ArticleSaver::new(storage.clone());

        let first = saver.save(input("https://bbc.com/news/1")).await;
        assert!(first.success);
        assert_eq!(first.article_id, Some(1));
        assert_eq!(first.message, "Article saved with ID 1");

        let second = saver.save(input("https://bbc.com/news/1")).await;
        assert!(!second.success);
        assert_eq!(second.article_id, None);
        assert_eq!(second.message, DUPLICATE_MESSAGE);
        assert_eq!(storage.list_recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_published_at_is_honoured() {
        let storage = Arc::new(InMemoryStorage::new());
        let saver = ArticleSaver::new(storage.clone());

        let mut backfilled = input("https://bbc.com/news/2021");
        backfilled.published_at = Some("2021-07-14".to_string());
        assert!(saver.save(backfilled).await.success);

        let stored = storage.list_recent(1).await.unwrap();
        assert_eq!(stored[0].published_at.year(), 2021);
    }

    #[tokio::test]
    async fn test_call_reports_invalid_input() {
        let saver = ArticleSaver::new(Arc::new(InMemoryStorage::new()));
        let output = saver.call(json!({ "title": "missing everything else" })).await;
        assert_eq!(output["success"], false);
        assert!(output["message"].as_str().unwrap().starts_with("Error: "));
        assert!(output.get("articleId").is_none());
    }

    #[tokio::test]
    async fn test_call_reports_empty_summary() {
        let saver = ArticleSaver::new(Arc::new(InMemoryStorage::new()));
        let mut bad = input("https://bbc.com/news/3");
        bad.summary = String::new();
        let output = saver.call(serde_json::to_value(bad).unwrap()).await;
        assert_eq!(output["success"], false);
        assert_eq!(output["message"], "Error: Invalid article: summary must not be empty");
    }
}
