pub mod http;
pub mod scrapers;

pub use scrapers::discoverer::{NewsDiscoverer, NewsSource};
pub use scrapers::fetcher::ContentFetcher;

pub mod prelude {
    pub use super::scrapers::discoverer::{default_sources, NewsDiscoverer, NewsSource};
    pub use super::scrapers::fetcher::{extract_article, ContentFetcher};
    pub use yaas_core::{Candidate, Error, FetchedContent, Result};
}
