//! Waterfall image resolution.
//!
//! Stages run in priority order and the first hit wins; later stages are
//! never called once one succeeds. Every hit is normalized, and when nothing
//! is found the local placeholder is returned, so resolution never fails.
//!
//! - [`sources`] - The three lookup stages
//! - [`normalize`] - URL normalization and the placeholder

pub mod normalize;
pub mod sources;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::traits::transport::{HttpTransport, Lookup, StageOutcomes};
use crate::types::config::EndpointConfig;
use normalize::{normalize_image_url, PLACEHOLDER_IMAGE};
use sources::{EncyclopediaThumbnail, ImageLookup, MediaRepositorySearch, WebImageSearch};

/// Result of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Normalized image URL, or the placeholder
    pub url: String,

    /// Stage that produced the image; `None` for the placeholder
    pub stage: Option<String>,

    pub outcomes: StageOutcomes,
}

impl ResolvedImage {
    pub fn is_placeholder(&self) -> bool {
        self.stage.is_none()
    }
}

/// Ordered image lookup.
pub struct ImageResolver {
    stages: Vec<Box<dyn ImageLookup>>,
}

impl ImageResolver {
    /// Build the standard waterfall: encyclopedia thumbnail, web image
    /// search, media repository file search.
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: &EndpointConfig) -> Self {
        Self::with_stages(vec![
            Box::new(EncyclopediaThumbnail::new(
                transport.clone(),
                &endpoints.encyclopedia_api,
            )),
            Box::new(WebImageSearch::new(transport.clone(), &endpoints.image_search)),
            Box::new(MediaRepositorySearch::new(
                transport,
                &endpoints.media_repository_api,
            )),
        ])
    }

    /// Build from explicit stages, tried in the given order.
    pub fn with_stages(stages: Vec<Box<dyn ImageLookup>>) -> Self {
        Self { stages }
    }

    /// Resolve a representative image for a label.
    pub async fn resolve(&self, query: &str) -> ResolvedImage {
        let query = query.trim();
        let mut outcomes = StageOutcomes::default();

        if query.is_empty() {
            return ResolvedImage {
                url: PLACEHOLDER_IMAGE.to_string(),
                stage: None,
                outcomes,
            };
        }

        for stage in &self.stages {
            let lookup = stage.lookup(query).await;
            outcomes.record(&lookup);
            match lookup {
                Lookup::Found(url) => {
                    debug!(stage = stage.name(), query, "Image found");
                    return ResolvedImage {
                        url: normalize_image_url(&url),
                        stage: Some(stage.name().to_string()),
                        outcomes,
                    };
                }
                Lookup::NotFound => {
                    debug!(stage = stage.name(), query, "No image");
                }
                Lookup::TransportError(detail) => {
                    warn!(stage = stage.name(), query, error = %detail, "Image lookup failed");
                }
            }
        }

        ResolvedImage {
            url: PLACEHOLDER_IMAGE.to_string(),
            stage: None,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    const WIKI_HIT: &str =
        r#"{"query":{"pages":{"1":{"original":{"source":"https://upload.wikimedia.org/x/Statue.tif"}}}}}"#;
    const WIKI_MISS: &str = r#"{"query":{"pages":{"-1":{"missing":""}}}}"#;
    const COMMONS_HIT: &str = r#"{"query":{"search":[{"title":"File:Statue.jpg"}]}}"#;

    fn resolver(transport: &Arc<MockTransport>) -> ImageResolver {
        ImageResolver::new(transport.clone(), &EndpointConfig::default())
    }

    #[tokio::test]
    async fn test_first_stage_short_circuits() {
        let transport = Arc::new(MockTransport::new().with_response("wikipedia", WIKI_HIT));

        let image = resolver(&transport).resolve("Statue").await;

        assert_eq!(
            image.url,
            "https://commons.wikimedia.org/w/index.php?title=Special:Redirect/file/Statue.tif&width=800"
        );
        assert_eq!(image.stage.as_deref(), Some("encyclopedia_thumbnail"));
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(transport.calls_matching("google"), 0);
        assert_eq!(transport.calls_matching("commons"), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_last_stage() {
        let transport = Arc::new(
            MockTransport::new()
                .with_response("wikipedia", WIKI_MISS)
                .with_failure("google")
                .with_response("commons", COMMONS_HIT),
        );

        let image = resolver(&transport).resolve("Statue").await;

        assert_eq!(image.stage.as_deref(), Some("media_repository_search"));
        assert_eq!(
            image.outcomes,
            StageOutcomes {
                not_found: 1,
                failed: 1
            }
        );
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_placeholder_when_nothing_found() {
        let transport = Arc::new(
            MockTransport::new()
                .with_response("wikipedia", WIKI_MISS)
                .with_response("google", "<html></html>")
                .with_response("commons", r#"{"query":{"search":[]}}"#),
        );

        let image = resolver(&transport).resolve("Nothing").await;

        assert!(image.is_placeholder());
        assert_eq!(image.url, PLACEHOLDER_IMAGE);
        assert_eq!(image.outcomes.not_found, 3);
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_calls() {
        let transport = Arc::new(MockTransport::new());

        let image = resolver(&transport).resolve("   ").await;

        assert_eq!(image.url, PLACEHOLDER_IMAGE);
        assert!(transport.calls().is_empty());
    }
}
