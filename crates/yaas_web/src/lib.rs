use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use yaas_core::Result;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/articles", get(handlers::list_articles))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serves the read API until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use yaas_core::{Article, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;
    use yaas_core::{Article, ArticleStorage, Error, NewArticle};
    use yaas_storage::InMemoryStorage;

    struct BrokenStorage;

    #[async_trait]
    impl ArticleStorage for BrokenStorage {
        fn name(&self) -> &str {
            "broken"
        }

        async fn initialize(&self) -> Result<()> {
            Ok(())
        }

        async fn save(&self, _article: &NewArticle) -> Result<Article> {
            Err(Error::Storage("connection refused".to_string()))
        }

        async fn exists(&self, _source_url: &str) -> Result<bool> {
            Err(Error::Storage("connection refused".to_string()))
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<Article>> {
            Err(Error::Storage("connection refused".to_string()))
        }
    }

    fn article(n: u32) -> NewArticle {
        NewArticle {
            title: format!("Founder story {}", n),
            content: "Body".to_string(),
            summary: "Summary".to_string(),
            source_name: "BBC Africa".to_string(),
            source_url: format!("https://example.com/{}", n),
            published_at: Utc.with_ymd_and_hms(2024, 1, n, 0, 0, 0).unwrap(),
            image_url: None,
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let state = AppState::new(Arc::new(InMemoryStorage::new()), "missing");
        let (status, body) = get_json(create_app(state), "/api/articles").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "success": true, "articles": [], "total": 0 }));
    }

    #[tokio::test]
    async fn test_lists_newest_first_capped_at_page_size() {
        let storage = Arc::new(InMemoryStorage::new());
        for n in 1..=28 {
            storage.save(&article(n)).await.unwrap();
        }
        for n in 1..=28 {
            let mut extra = article(n);
            extra.source_url = format!("https://example.com/extra/{}", n);
            storage.save(&extra).await.unwrap();
        }

        let (status, body) = get_json(create_app(AppState::new(storage, "missing")), "/api/articles").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 50);
        let articles = body["articles"].as_array().unwrap();
        assert_eq!(articles.len(), 50);
        assert!(articles[0]["publishedAt"].as_str().unwrap().starts_with("2024-01-28"));
        assert!(articles[0].get("sourceUrl").is_some());
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let state = AppState::new(Arc::new(BrokenStorage), "missing");
        let (status, body) = get_json(create_app(state), "/api/articles").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Storage error: connection refused");
    }

    #[tokio::test]
    async fn test_missing_frontend_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Arc::new(InMemoryStorage::new()), dir.path());
        let (status, body) = get_json(create_app(state), "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Frontend not found");
    }

    #[tokio::test]
    async fn test_serves_index_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>YAAS</h1>").unwrap();
        let state = AppState::new(Arc::new(InMemoryStorage::new()), dir.path());

        let response = create_app(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>YAAS</h1>");
    }
}
