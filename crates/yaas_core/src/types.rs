use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A curated article as persisted by the store.
///
/// Serializes with the public camelCase field names used by the read API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub source_name: String,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

/// An article ready for insertion. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub source_name: String,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

impl NewArticle {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("title", &self.title),
            ("content", &self.content),
            ("summary", &self.summary),
            ("sourceUrl", &self.source_url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidArticle(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }

    /// Builds the persisted form once the store has assigned identity.
    pub fn into_article(self, id: i64, created_at: DateTime<Utc>) -> Article {
        Article {
            id,
            title: self.title,
            content: self.content,
            summary: self.summary,
            source_name: self.source_name,
            source_url: self.source_url,
            published_at: self.published_at,
            created_at,
            image_url: self.image_url,
        }
    }
}

/// A discovered news item that has not been fetched yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub source: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Main text extracted from an article page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedContent {
    pub title: String,
    pub content: String,
}
