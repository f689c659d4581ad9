use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use yaas_core::{Article, ArticleStorage, Error, NewArticle, Result};

use super::{is_unique_violation, storage_error};
use crate::StorageConfig;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS yaas_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        summary TEXT NOT NULL,
        source_name TEXT NOT NULL,
        source_url TEXT NOT NULL,
        published_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        image_url TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_yaas_articles_published_at ON yaas_articles (published_at DESC)",
];

const UNIQUE_SOURCE_URL: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_yaas_articles_source_url ON yaas_articles (source_url)";

/// Timestamps are stored as fixed-width RFC 3339 text so that lexical
/// order matches chronological order.
fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date {:?}: {}", raw, e)))
}

pub struct SQLiteStorage {
    pool: SqlitePool,
    unique_source_url: bool,
}

impl SQLiteStorage {
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| storage_error("Invalid SQLite URL", e))?
            .create_if_missing(true);
        Self::connect_with(options, config).await
    }

    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::connect_with(options, &StorageConfig::default()).await
    }

    async fn connect_with(options: SqliteConnectOptions, config: &StorageConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        Ok(Self {
            pool,
            unique_source_url: config.unique_source_url,
        })
    }

    fn row_to_article(row: &SqliteRow) -> Result<Article> {
        let get_err = |e| storage_error("Failed to read article row", e);
        Ok(Article {
            id: row.try_get("id").map_err(get_err)?,
            title: row.try_get("title").map_err(get_err)?,
            content: row.try_get("content").map_err(get_err)?,
            summary: row.try_get("summary").map_err(get_err)?,
            source_name: row.try_get("source_name").map_err(get_err)?,
            source_url: row.try_get("source_url").map_err(get_err)?,
            published_at: decode_time(&row.try_get::<String, _>("published_at").map_err(get_err)?)?,
            created_at: decode_time(&row.try_get::<String, _>("created_at").map_err(get_err)?)?,
            image_url: row.try_get("image_url").map_err(get_err)?,
        })
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    fn name(&self) -> &str {
        "sqlite"
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
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO yaas_articles
            (title, content, summary, source_name, source_url, published_at, created_at, image_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.summary)
        .bind(&article.source_name)
        .bind(&article.source_url)
        .bind(encode_time(&article.published_at))
        .bind(encode_time(&created_at))
        .bind(article.image_url.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateArticle(article.source_url.clone())
            } else {
                storage_error("Failed to store article", e)
            }
        })?;

        let id = result.last_insert_rowid();
        let row = sqlx::query("SELECT * FROM yaas_articles WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to read stored article", e))?;
        Self::row_to_article(&row)
    }

    async fn exists(&self, source_url: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM yaas_articles WHERE source_url = ?")
            .bind(source_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to check article existence", e))?;
        Ok(count > 0)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM yaas_articles
            ORDER BY published_at DESC
            LIMIT ?
            "#,
        )
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
