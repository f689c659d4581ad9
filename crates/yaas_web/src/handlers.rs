use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use yaas_core::Article;

use crate::AppState;

/// Number of articles returned by the listing endpoint.
pub const ARTICLE_PAGE_SIZE: usize = 50;

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub success: bool,
    pub articles: Vec<Article>,
    pub total: usize,
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> Response {
    match state.storage.list_recent(ARTICLE_PAGE_SIZE).await {
        Ok(articles) => Json(ArticleList {
            success: true,
            total: articles.len(),
            articles,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Error fetching articles");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let path = state.public_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Frontend not found" })),
        )
            .into_response(),
    }
}
