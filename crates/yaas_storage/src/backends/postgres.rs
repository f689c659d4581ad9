use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use yaas_core::{Article, ArticleStorage, Error, NewArticle, Result};

use super::{is_unique_violation, storage_error};
use crate::StorageConfig;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS yaas_articles (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        summary TEXT NOT NULL,
        source_name TEXT NOT NULL,
        source_url TEXT NOT NULL,
        published_at TIMESTAMP NOT NULL DEFAULT NOW(),
        created_at TIMESTAMP NOT NULL DEFAULT NOW(),
        image_url TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_yaas_articles_published_at ON yaas_articles (published_at DESC)",
];

const UNIQUE_SOURCE_URL: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_yaas_articles_source_url ON yaas_articles (source_url)";

const COLUMNS: &str =
    "id, title, content, summary, source_name, source_url, published_at, created_at, image_url";

/// Postgres-backed article store.
///
/// Every call checks a connection out of the pool for the duration of a
/// single query; nothing is held across the exists/save pair.
pub struct PostgresStorage {
    pool: PgPool,
    unique_source_url: bool,
}

impl PostgresStorage {
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        Ok(Self {
            pool,
            unique_source_url: config.unique_source_url,
        })
    }

    fn row_to_article(row: &PgRow) -> Result<Article> {
        let get_err = |e| storage_error("Failed to read article row", e);
        Ok(Article {
            id: row.try_get::<i32, _>("id").map_err(get_err)? as i64,
            title: row.try_get("title").map_err(get_err)?,
            content: row.try_get("content").map_err(get_err)?,
            summary: row.try_get("summary").map_err(get_err)?,
            source_name: row.try_get("source_name").map_err(get_err)?,
            source_url: row.try_get("source_url").map_err(get_err)?,
            published_at: row.try_get::<NaiveDateTime, _>("published_at").map_err(get_err)?.and_utc(),
            created_at: row.try_get::<NaiveDateTime, _>("created_at").map_err(get_err)?.and_utc(),
            image_url: row.try_get("image_url").map_err(get_err)?,
        })
    }
}

#[async_trait]
impl ArticleStorage for PostgresStorage {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn initialize(&self) -> Result<()> {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }
        if self.unique_source_url {
            sqlx::query(UNIQUE_SOURCE_URL)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("Failed to create source_url constraint", e))?;
        }
        Ok(())
    }

    async fn save(&self, article: &NewArticle) -> Result<Article> {
        article.validate()?;

        let sql = format!(
            r#"
            INSERT INTO yaas_articles
            (title, content, summary, source_name, source_url, published_at, created_at, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&article.title)
            .bind(&article.content)
            .bind(&article.summary)
            .bind(&article.source_name)
            .bind(&article.source_url)
            .bind(article.published_at.naive_utc())
            .bind(Utc::now().naive_utc())
            .bind(article.image_url.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::DuplicateArticle(article.source_url.clone())
                } else {
                    storage_error("Failed to store article", e)
                }
            })?;

        Self::row_to_article(&row)
    }

    async fn exists(&self, source_url: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM yaas_articles WHERE source_url = $1")
            .bind(source_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to check article existence", e))?;
        Ok(count > 0)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        let sql = format!(
            "SELECT {} FROM yaas_articles ORDER BY published_at DESC LIMIT $1",
            COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list recent articles", e))?;

        rows.iter().map(Self::row_to_article).collect()
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
