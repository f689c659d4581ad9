pub mod discoverer;
pub mod fetcher;

/// Common utilities for scrapers
pub(crate) mod utils {
    use ego_tree::NodeRef;
    use scraper::node::Element;
    use scraper::{ElementRef, Node, Selector};
    use url::Url;
    use yaas_core::{Error, Result};

    /// Elements whose subtree never counts as article text.
    const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "iframe"];
    const STRIPPED_CLASSES: &[&str] = &["advertisement"];

    pub fn selector(css: &str) -> Selector {
        // Only called with the literal selectors in this crate.
        Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {:?}: {:?}", css, e))
    }

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Resolves `href` against the scheme and host of `base`, leaving
    /// absolute links untouched.
    pub fn resolve_against_origin(base: &Url, href: &str) -> Option<String> {
        if let Ok(absolute) = Url::parse(href) {
            return Some(absolute.to_string());
        }
        let mut origin = base.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin.join(href).ok().map(|url| url.to_string())
    }

    /// First `max` characters of `text`, never splitting a code point.
    pub fn truncate_chars(text: &str, max: usize) -> String {
        match text.char_indices().nth(max) {
            Some((idx, _)) => text[..idx].to_string(),
            None => text.to_string(),
        }
    }

    fn is_stripped_element(element: &Element) -> bool {
        STRIPPED_TAGS.contains(&element.name())
            || element.classes().any(|class| STRIPPED_CLASSES.contains(&class))
    }

    /// Whether the node sits inside script, navigation, chrome or ad markup.
    pub fn is_stripped(node: NodeRef<'_, Node>) -> bool {
        std::iter::once(node)
            .chain(node.ancestors())
            .any(|n| n.value().as_element().map_or(false, is_stripped_element))
    }

    /// Text content of `element`, skipping stripped descendants.
    pub fn visible_text(element: ElementRef<'_>) -> String {
        element
            .descendants()
            .filter(|node| !is_stripped(*node))
            .filter_map(|node| node.value().as_text().map(|text| &**text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use scraper::Html;

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_resolve_against_origin() {
        let base = utils::parse_url("https://dailytrust.com/category/business/").unwrap();
        assert_eq!(
            utils::resolve_against_origin(&base, "/young-founder-story").as_deref(),
            Some("https://dailytrust.com/young-founder-story")
        );
        assert_eq!(
            utils::resolve_against_origin(&base, "https://www.bbc.com/news/x").as_deref(),
            Some("https://www.bbc.com/news/x")
        );
        assert_eq!(
            utils::resolve_against_origin(&base, "story").as_deref(),
            Some("https://dailytrust.com/story")
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(utils::truncate_chars("hello", 10), "hello");
        assert_eq!(utils::truncate_chars("hello", 2), "he");
        assert_eq!(utils::truncate_chars("Côte d'Ivoire", 3), "Côt");
    }

    #[test]
    fn test_visible_text_skips_stripped_descendants() {
        let html = r#"
            <div id="root">Lead <script>var x = 1;</script><span class="advertisement">Buy now</span>tail</div>
        "#;
        let document = Html::parse_document(html);
        let root = document.select(&utils::selector("#root")).next().unwrap();
        assert_eq!(utils::visible_text(root), "Lead tail");
    }

    #[test]
    fn test_is_stripped_checks_ancestors() {
        let html = "<footer><p id='inner'>Copyright</p></footer><p id='outer'>Body</p>";
        let document = Html::parse_document(html);
        let inner = document.select(&utils::selector("#inner")).next().unwrap();
        let outer = document.select(&utils::selector("#outer")).next().unwrap();
        assert!(utils::is_stripped(*inner));
        assert!(!utils::is_stripped(*outer));
    }
}
