use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use yaas_core::{Article, ArticleStorage, Error, NewArticle, Result};

use crate::StorageConfig;

#[derive(Default)]
struct MemoryStore {
    articles: Vec<Article>,
    next_id: i64,
}

/// Process-local store, used for dry runs and tests.
#[derive(Default)]
pub struct InMemoryStorage {
    store: RwLock<MemoryStore>,
    unique_source_url: bool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &StorageConfig) -> Self {
        Self {
            store: RwLock::default(),
            unique_source_url: config.unique_source_url,
        }
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save(&self, article: &NewArticle) -> Result<Article> {
        article.validate()?;
        let mut store = self.store.write().await;
        if self.unique_source_url && store.articles.iter().any(|a| a.source_url == article.source_url) {
            return Err(Error::DuplicateArticle(article.source_url.clone()));
        }
        store.next_id += 1;
        let saved = article.clone().into_article(store.next_id, Utc::now());
        store.articles.push(saved.clone());
        Ok(saved)
    }

    async fn exists(&self, source_url: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store.articles.iter().any(|a| a.source_url == source_url))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        let mut articles = store.articles.clone();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(limit);
        Ok(articles)
    }
}
