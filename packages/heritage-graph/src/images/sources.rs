//! The three image lookup stages.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::error::TransportResult;
use crate::traits::transport::{HttpRequest, HttpTransport, Lookup};

/// One stage of the image waterfall.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Search for an image representing `query`.
    async fn lookup(&self, query: &str) -> Lookup<String>;

    /// Stage name for logging.
    fn name(&self) -> &str;
}

// --- Encyclopedia page thumbnail ---

/// Page image of the encyclopedia article titled like the query.
pub struct EncyclopediaThumbnail {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl EncyclopediaThumbnail {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self, query: &str) -> TransportResult<Option<String>> {
        let request = HttpRequest::with_params(
            &self.endpoint,
            [
                ("action", "query"),
                ("prop", "pageimages"),
                ("piprop", "original|thumbnail"),
                ("pithumbsize", "800"),
                ("redirects", "1"),
                ("format", "json"),
                ("titles", query),
            ],
        )?;
        let json = self.transport.get_json(&request).await?;

        let Some(pages) = json.pointer("/query/pages").and_then(|p| p.as_object()) else {
            return Ok(None);
        };
        Ok(pages.values().find_map(|page| {
            page.pointer("/original/source")
                .or_else(|| page.pointer("/thumbnail/source"))
                .and_then(|s| s.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }))
    }
}

#[async_trait]
impl ImageLookup for EncyclopediaThumbnail {
    async fn lookup(&self, query: &str) -> Lookup<String> {
        Lookup::from_result(self.fetch(query).await)
    }

    fn name(&self) -> &str {
        "encyclopedia_thumbnail"
    }
}

// --- Web image search ---

/// Quoted absolute image URLs embedded in a results page.
static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"(https?://[^"]+?\.(?:jpg|png|jpeg))""#).expect("static image URL pattern")
});

/// Hosts serving thumbnails and icons rather than the image itself.
const EXCLUDED_HOSTS: &[&str] = &["gstatic.com", "favicon"];

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// First full-size image URL scraped from an HTML search results page.
pub struct WebImageSearch {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl WebImageSearch {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self, query: &str) -> TransportResult<Option<String>> {
        let request = HttpRequest::with_params(&self.endpoint, [("tbm", "isch"), ("q", query)])?
            .header("User-Agent", BROWSER_USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            );
        let html = self.transport.get_text(&request).await?;
        Ok(scrape_image_url(&html))
    }
}

/// Pull the first usable image URL out of a results page.
pub fn scrape_image_url(html: &str) -> Option<String> {
    IMAGE_URL
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().replace("\\u002F", "/"))
        .find(|url| !EXCLUDED_HOSTS.iter().any(|h| url.contains(h)))
}

#[async_trait]
impl ImageLookup for WebImageSearch {
    async fn lookup(&self, query: &str) -> Lookup<String> {
        Lookup::from_result(self.fetch(query).await)
    }

    fn name(&self) -> &str {
        "web_image_search"
    }
}

// --- Media repository file search ---

const FILE_PAGE_BASE: &str = "https://commons.wikimedia.org/wiki/";

/// First hit of a full-text search restricted to the file namespace.
pub struct MediaRepositorySearch {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl MediaRepositorySearch {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self, query: &str) -> TransportResult<Option<String>> {
        let request = HttpRequest::with_params(
            &self.endpoint,
            [
                ("action", "query"),
                ("list", "search"),
                ("srnamespace", "6"),
                ("srlimit", "1"),
                ("format", "json"),
                ("srsearch", query),
            ],
        )?;
        let json = self.transport.get_json(&request).await?;

        // Returns the file description page; normalization turns it into a
        // renderable redirect.
        Ok(json
            .pointer("/query/search/0/title")
            .and_then(|t| t.as_str())
            .map(str::trim)
            .filter(|t| t.starts_with("File:"))
            .map(|t| format!("{FILE_PAGE_BASE}{}", t.replace(' ', "_"))))
    }
}

#[async_trait]
impl ImageLookup for MediaRepositorySearch {
    async fn lookup(&self, query: &str) -> Lookup<String> {
        Lookup::from_result(self.fetch(query).await)
    }

    fn name(&self) -> &str {
        "media_repository_search"
    }
}
