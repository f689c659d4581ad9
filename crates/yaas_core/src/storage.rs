use async_trait::async_trait;
use crate::types::{Article, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Create the articles table and its `published_at` index if missing
    async fn initialize(&self) -> Result<()>;

    /// Insert an article; the store assigns `id` and `created_at`
    async fn save(&self, article: &NewArticle) -> Result<Article>;

    /// Whether any stored article has exactly this source URL
    async fn exists(&self, source_url: &str) -> Result<bool>;

    /// Up to `limit` articles, most recently published first
    async fn list_recent(&self, limit: usize) -> Result<Vec<Article>>;

    /// Drain pooled connections
    async fn close(&self) {}
}
