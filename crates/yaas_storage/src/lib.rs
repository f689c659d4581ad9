use std::sync::Arc;

use yaas_core::{ArticleStorage, Error, Result};

pub mod backends;
pub mod saver;

pub use backends::*;
pub use saver::ArticleSaver;

/// Name of the articles table shared by the SQL backends.
pub const ARTICLES_TABLE: &str = "yaas_articles";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Connection string, e.g. `postgres://...` or `sqlite:articles.db`
    pub url: String,
    pub max_connections: u32,
    /// Also create a UNIQUE index on `source_url`, closing the window
    /// between the saver's existence check and its insert.
    pub unique_source_url: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:articles.db".to_string(),
            max_connections: 5,
            unique_source_url: false,
        }
    }
}

impl StorageConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Connects the named backend and makes sure its schema exists.
pub async fn create_storage(kind: &str, config: &StorageConfig) -> Result<Arc<dyn ArticleStorage>> {
    let storage: Arc<dyn ArticleStorage> = match kind {
        "memory" => Arc::new(InMemoryStorage::with_config(config)),
        #[cfg(feature = "postgres")]
        "postgres" => Arc::new(PostgresStorage::connect(config).await?),
        #[cfg(feature = "sqlite")]
        "sqlite" => Arc::new(SQLiteStorage::connect(config).await?),
        other => {
            return Err(Error::Config(format!("Unsupported storage backend: {}", other)));
        }
    };
    storage.initialize().await?;
    tracing::info!(backend = storage.name(), "Storage initialized");
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, ArticleSaver, StorageConfig};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_storage() {
        let storage = create_storage("memory", &StorageConfig::default()).await.unwrap();
        assert_eq!(storage.name(), "memory");
        assert!(storage.list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let err = create_storage("qdrant", &StorageConfig::default()).await.err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
