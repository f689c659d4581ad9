//! The `article-fetcher` capability: downloads a page and pulls out its
//! headline and body text with a chain of increasingly loose heuristics.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use yaas_core::tools::{self, parse_input, FetchInput, FetchOutput, ARTICLE_FETCHER};
use yaas_core::{Error, FetchedContent, Result, Tool};

use super::utils::{is_stripped, selector, truncate_chars, visible_text};
use crate::http;

/// Paragraphs at or under this many characters are treated as chrome.
pub const MIN_PARAGRAPH_CHARS: usize = 50;
/// Container paragraphs shorter than this in total trigger the fallback.
pub const MIN_BODY_CHARS: usize = 200;
pub const FALLBACK_PARAGRAPHS: usize = 15;
pub const MAX_CONTENT_CHARS: usize = 4000;

const CONTENT_PARAGRAPHS: &str = "article p, .article-body p, .content p, main p";

/// Title sources, tried in order until one is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStrategy {
    FirstHeading,
    OpenGraph,
    DocumentTitle,
}

impl TitleStrategy {
    pub const CHAIN: [TitleStrategy; 3] = [Self::FirstHeading, Self::OpenGraph, Self::DocumentTitle];

    fn extract(self, document: &Html) -> Option<String> {
        let title = match self {
            Self::FirstHeading => document
                .select(&selector("h1"))
                .find(|h1| !is_stripped(**h1))
                .map(visible_text),
            Self::OpenGraph => document
                .select(&selector(r#"meta[property="og:title"]"#))
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .map(str::to_string),
            Self::DocumentTitle => document
                .select(&selector("title"))
                .next()
                .map(|title| title.text().collect()),
        };
        title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
    }
}

/// Body sources, tried in order until one yields enough text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    /// Paragraphs inside article-like containers
    ContentContainers,
    /// The first paragraphs anywhere on the page
    AllParagraphs,
}

impl BodyStrategy {
    pub const CHAIN: [BodyStrategy; 2] = [Self::ContentContainers, Self::AllParagraphs];

    fn extract(self, document: &Html) -> String {
        let (css, limit) = match self {
            Self::ContentContainers => (CONTENT_PARAGRAPHS, usize::MAX),
            Self::AllParagraphs => ("p", FALLBACK_PARAGRAPHS),
        };
        document
            .select(&selector(css))
            .filter(|p| !is_stripped(**p))
            .map(|p| visible_text(p).trim().to_string())
            .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
            .take(limit)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn accepts(self, body: &str) -> bool {
        match self {
            Self::ContentContainers => body.chars().count() >= MIN_BODY_CHARS,
            Self::AllParagraphs => true,
        }
    }
}

/// Extracts title and body text from an article page.
///
/// Never fails: markup without recognisable content yields empty strings.
pub fn extract_article(html: &str) -> FetchedContent {
    let document = Html::parse_document(html);

    let title = TitleStrategy::CHAIN
        .iter()
        .find_map(|strategy| strategy.extract(&document))
        .unwrap_or_default();

    let mut content = String::new();
    for strategy in BodyStrategy::CHAIN {
        content = strategy.extract(&document);
        if strategy.accepts(&content) {
            break;
        }
    }

    FetchedContent {
        title,
        content: truncate_chars(&content, MAX_CONTENT_CHARS),
    }
}

pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(http::build_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_content(&self, url: &str) -> Result<FetchedContent> {
        let html = http::fetch_html(&self.client, url).await?;
        Ok(extract_article(&html))
    }

    pub async fn fetch(&self, url: &str, source_name: &str) -> FetchOutput {
        info!(%url, source = source_name, "Fetching article content");

        match self.fetch_content(url).await {
            Ok(fetched) => {
                info!(%url, content_length = fetched.content.chars().count(), "Article fetched");
                FetchOutput {
                    success: true,
                    content: Some(fetched.content),
                    title: Some(fetched.title),
                    error: None,
                }
            }
            Err(Error::HttpStatus { status, .. }) => {
                warn!(%url, status, "Failed to fetch article");
                FetchOutput::failed(format!("Failed to fetch: {}", status))
            }
            Err(e) => {
                error!(%url, error = %e, "Error fetching article");
                FetchOutput::failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl Tool for ContentFetcher {
    fn id(&self) -> &'static str {
        ARTICLE_FETCHER
    }

    fn description(&self) -> &'static str {
        "Fetches the full content of an article from a given URL, extracting the main text content and any available metadata"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "The URL of the article to fetch" },
                "sourceName": { "type": "string", "description": "The name of the news source" }
            },
            "required": ["url", "sourceName"]
        })
    }

    async fn call(&self, input: Value) -> Value {
        let output = match parse_input::<FetchInput>(input) {
            Ok(input) => self.fetch(&input.url, &input.source_name).await,
            Err(e) => FetchOutput::failed(e.to_string()),
        };
        tools::to_value(&output)
    }
}
