//! The capability seam between the curation agent and the pipeline.
//!
//! Each capability is a [`Tool`] taking and returning JSON. The input and
//! output shapes below are the stable contract: field names are camelCase
//! and must not change when the agent backend does.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Candidate;
use crate::{Error, Result};

pub const NEWS_SCRAPER: &str = "news-scraper";
pub const ARTICLE_FETCHER: &str = "article-fetcher";
pub const ARTICLE_SAVER: &str = "article-saver";

#[async_trait]
pub trait Tool: Send + Sync {
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the accepted input object
    fn input_schema(&self) -> Value;

    /// Run the capability. Failures are reported inside the returned
    /// object, never as an `Err`.
    async fn call(&self, input: Value) -> Value;
}

pub fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T> {
    // Models sometimes send `null` for tools whose fields are all optional.
    let input = if input.is_null() { Value::Object(Default::default()) } else { input };
    serde_json::from_value(input).map_err(Error::from)
}

pub fn to_value<T: Serialize>(output: &T) -> Value {
    serde_json::to_value(output).unwrap_or(Value::Null)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverOutput {
    pub articles: Vec<Candidate>,
    pub total_found: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchInput {
    pub url: String,
    #[serde(default)]
    pub source_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutput {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInput {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub source_name: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<i64>,
    pub message: String,
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` and plain `YYYY-MM-DD` dates.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
