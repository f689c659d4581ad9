//! The `news-scraper` capability: scans a few news index pages for stories
//! about young African entrepreneurs.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use url::Url;
use yaas_core::tools::{self, parse_input, DiscoverInput, DiscoverOutput, NEWS_SCRAPER};
use yaas_core::{Candidate, Result, Tool};

use super::utils::{parse_url, resolve_against_origin, selector, truncate_chars};
use crate::http;

/// A candidate is kept only if its title or snippet mentions one of these.
pub const KEYWORDS: [&str; 9] = [
    "entrepreneur",
    "startup",
    "innovator",
    "founder",
    "business",
    "innovation",
    "tech",
    "young",
    "africa",
];

/// Candidates kept across all sources before scanning stops.
pub const MAX_CANDIDATES: usize = 10;
/// Candidates handed back to the caller.
pub const MAX_RETURNED: usize = 5;
pub const MAX_SNIPPET_CHARS: usize = 300;
const FALLBACK_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsSource {
    pub name: String,
    pub url: String,
    /// CSS selector matching one story block on the index page
    pub selector: String,
}

impl NewsSource {
    pub fn new(name: &str, url: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            selector: selector.to_string(),
        }
    }

    /// A caller-supplied index URL, named after its host.
    pub fn from_url(url: &str) -> Self {
        let name = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.to_string());
        Self::new(&name, url, "article")
    }
}

pub fn default_sources() -> Vec<NewsSource> {
    vec![
        NewsSource::new("BBC Africa", "https://www.bbc.com/news/topics/cl8l9mveql2t", "article"),
        NewsSource::new("Daily Trust", "https://dailytrust.com/category/business/", "article"),
    ]
}

/// Case-insensitive substring match against [`KEYWORDS`].
pub fn matches_keywords(title: &str, snippet: &str) -> bool {
    let haystack = format!("{} {}", title, snippet).to_lowercase();
    KEYWORDS.iter().any(|keyword| haystack.contains(keyword))
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn candidate_from_element(element: ElementRef<'_>, source: &NewsSource, base: &Url) -> Option<Candidate> {
    let link = element.select(&selector("a")).next();

    let mut title = link.map(trimmed_text).unwrap_or_default();
    if title.is_empty() {
        title = element
            .select(&selector("h2, h3"))
            .map(|heading| heading.text().collect::<String>())
            .collect::<String>()
            .trim()
            .to_string();
    }
    let href = link
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .unwrap_or_default();
    if title.is_empty() || href.is_empty() {
        return None;
    }
    let url = resolve_against_origin(base, href)?;

    let snippet = element
        .select(&selector("p"))
        .next()
        .map(trimmed_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| truncate_chars(&trimmed_text(element), FALLBACK_SNIPPET_CHARS));

    if !matches_keywords(&title, &snippet) {
        return None;
    }

    Some(Candidate {
        title,
        url,
        source: source.name.clone(),
        snippet: truncate_chars(&snippet, MAX_SNIPPET_CHARS),
        published_date: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    })
}

/// Relevant candidates from one index page, at most `limit` of them.
pub fn extract_candidates(html: &str, source: &NewsSource, limit: usize) -> Result<Vec<Candidate>> {
    let base = parse_url(&source.url)?;
    let container = scraper::Selector::parse(&source.selector).map_err(|e| {
        yaas_core::Error::Config(format!("Invalid selector {:?} for {}: {:?}", source.selector, source.name, e))
    })?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&container)
        .filter_map(|element| candidate_from_element(element, source, &base))
        .take(limit)
        .collect())
}

pub struct NewsDiscoverer {
    client: Client,
    sources: Vec<NewsSource>,
}

impl NewsDiscoverer {
    pub fn new() -> Result<Self> {
        Ok(Self::with_sources(http::build_client()?, default_sources()))
    }

    pub fn with_sources(client: Client, sources: Vec<NewsSource>) -> Self {
        Self { client, sources }
    }

    pub fn sources(&self) -> &[NewsSource] {
        &self.sources
    }

    async fn scan_source(&self, source: &NewsSource, limit: usize) -> Result<Vec<Candidate>> {
        let html = http::fetch_html(&self.client, &source.url).await?;
        extract_candidates(&html, source, limit)
    }

    /// Scans the configured sources, or `overrides` when given.
    ///
    /// A failing source is logged and skipped. `total_found` counts every
    /// kept candidate even though only the first [`MAX_RETURNED`] are returned.
    pub async fn discover(&self, overrides: Option<Vec<String>>) -> DiscoverOutput {
        let sources = match overrides {
            Some(urls) if !urls.is_empty() => urls.iter().map(|url| NewsSource::from_url(url)).collect(),
            _ => self.sources.clone(),
        };
        info!(sources = sources.len(), "Starting news discovery");

        let mut kept: Vec<Candidate> = Vec::new();
        for source in &sources {
            if kept.len() >= MAX_CANDIDATES {
                break;
            }
            info!(source = %source.name, url = %source.url, "Fetching index page");
            match self.scan_source(source, MAX_CANDIDATES - kept.len()).await {
                Ok(found) => {
                    kept.extend(found);
                    info!(source = %source.name, total = kept.len(), "Relevant articles so far");
                }
                Err(yaas_core::Error::HttpStatus { status, .. }) => {
                    warn!(source = %source.name, status, "Failed to fetch index page");
                }
                Err(e) => {
                    error!(source = %source.name, error = %e, "Error scraping source");
                }
            }
        }

        let total_found = kept.len();
        kept.truncate(MAX_RETURNED);
        info!(total_found, returned = kept.len(), "News discovery complete");
        DiscoverOutput {
            articles: kept,
            total_found,
        }
    }
}

#[async_trait]
impl Tool for NewsDiscoverer {
    fn id(&self) -> &'static str {
        NEWS_SCRAPER
    }

    fn description(&self) -> &'static str {
        "Scrapes news articles from verified African news sources like BBC Africa, Daily Trust, and other legitimate outlets to find stories about young African entrepreneurs and innovators"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sources": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of news source URLs to scrape"
                }
            }
        })
    }

    async fn call(&self, input: Value) -> Value {
        let sources = match parse_input::<DiscoverInput>(input) {
            Ok(input) => input.sources,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed news-scraper input");
                None
            }
        };
        tools::to_value(&self.discover(sources).await)
    }
}
