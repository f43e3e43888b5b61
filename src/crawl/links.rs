// src/crawl/links.rs
// =============================================================================
// Extracts same-domain links from an HTML page.
//
// Rules:
// - every <a href> is resolved against the page URL (relative or absolute)
// - only http/https links on the page's own host and port are kept
// - fragments are dropped, so /page#a and /page#b are the same page
// - a link already present in `seen` is skipped; new links are inserted
//
// The `seen` set is the crawler's visited set. Inserting here, at discovery
// time, is what guarantees a URL is queued and fetched at most once.
// =============================================================================

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

// Returns the links on `html` that are new to `seen`, in document order
pub fn find_links(html: &str, page_url: &Url, seen: &mut HashSet<String>) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(page_url, href) else {
            continue;
        };
        if !same_origin(page_url, &url) {
            continue;
        }

        let url = url.to_string();
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    links
}

// Resolves a link (possibly relative) to an absolute URL without fragment
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

// Same host and effective port (what the browser calls the "netloc")
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://shop.example.com/en_us/index.html").unwrap()
    }

    #[test]
    fn test_resolve_relative_link() {
        let url = resolve_link(&page(), "/en_us/men.html").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/en_us/men.html");
    }

    #[test]
    fn test_resolve_path_relative_link() {
        let url = resolve_link(&page(), "women.html").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/en_us/women.html");
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let url = resolve_link(&page(), "/sale.html#top").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/sale.html");
    }

    #[test]
    fn test_skip_special_links() {
        assert_eq!(resolve_link(&page(), "#section"), None);
        assert_eq!(resolve_link(&page(), "mailto:help@example.com"), None);
        assert_eq!(resolve_link(&page(), "tel:+100000"), None);
        assert_eq!(resolve_link(&page(), "javascript:void(0)"), None);
        assert_eq!(resolve_link(&page(), "ftp://shop.example.com/file"), None);
    }

    #[test]
    fn test_find_links_keeps_same_domain_only() {
        let html = r#"
            <a href="/en_us/productpage.0001.html">Shirt</a>
            <a href="https://shop.example.com/en_us/men.html">Men</a>
            <a href="https://other.example.com/en_us/men.html">Elsewhere</a>
            <a href="http://shop.example.com:8080/en_us/men.html">Other port</a>
        "#;
        let mut seen = HashSet::new();

        let links = find_links(html, &page(), &mut seen);

        assert_eq!(
            links,
            vec![
                "https://shop.example.com/en_us/productpage.0001.html",
                "https://shop.example.com/en_us/men.html",
            ]
        );
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_find_links_skips_seen_and_duplicates() {
        let html = r#"
            <a href="/a.html">A</a>
            <a href="/a.html#again">A again</a>
            <a href="/b.html">B</a>
        "#;
        let mut seen = HashSet::new();
        seen.insert("https://shop.example.com/b.html".to_string());

        let links = find_links(html, &page(), &mut seen);

        assert_eq!(links, vec!["https://shop.example.com/a.html"]);
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_all_links_are_absolute() {
        let html = r#"<a href="../up.html">Up</a><a href="./here.html">Here</a>"#;
        let mut seen = HashSet::new();

        for link in find_links(html, &page(), &mut seen) {
            let parsed = Url::parse(&link).unwrap();
            assert!(same_origin(&page(), &parsed));
        }
    }
}
