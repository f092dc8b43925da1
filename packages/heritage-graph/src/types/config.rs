//! Configuration types for the pipeline and its outbound lookups.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::types::agent::AgentKind;

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Records per flushed batch.
    ///
    /// Bounds both memory use and what a crash can lose. Default: 50.
    pub batch_size: usize,

    /// Base URI every minted resource lives under.
    ///
    /// Default: `http://arp.ro/resource/`.
    pub base_uri: String,

    /// Namespace bound to the schema prefix. Default: `http://arp.ro/schema#`.
    pub schema_uri: String,

    /// Query external authorities for newly minted agents. Default: true.
    pub reconcile_agents: bool,

    /// Agent kinds to reconcile. Default: artists and museums.
    #[serde(default)]
    pub reconcile_kinds: Vec<AgentKind>,

    /// Link material and category terms to thesaurus concepts. Default: false.
    #[serde(default)]
    pub reconcile_terms: bool,

    /// Resolve an image for artworks without one. Default: true.
    pub resolve_images: bool,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub endpoints: EndpointConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            base_uri: "http://arp.ro/resource/".to_string(),
            schema_uri: "http://arp.ro/schema#".to_string(),
            reconcile_agents: true,
            reconcile_kinds: vec![AgentKind::Artist, AgentKind::Museum],
            reconcile_terms: false,
            resolve_images: true,
            http: HttpConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the resource base URI.
    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = uri.into();
        self
    }

    /// Set the schema namespace.
    pub fn with_schema_uri(mut self, uri: impl Into<String>) -> Self {
        self.schema_uri = uri.into();
        self
    }

    /// Enable or disable agent reconciliation.
    pub fn with_reconciliation(mut self, enabled: bool) -> Self {
        self.reconcile_agents = enabled;
        self
    }

    /// Set which agent kinds get reconciled.
    pub fn with_reconcile_kinds(mut self, kinds: impl IntoIterator<Item = AgentKind>) -> Self {
        self.reconcile_kinds = kinds.into_iter().collect();
        self
    }

    /// Enable or disable term reconciliation.
    pub fn with_term_reconciliation(mut self, enabled: bool) -> Self {
        self.reconcile_terms = enabled;
        self
    }

    /// Enable or disable image resolution.
    pub fn with_image_resolution(mut self, enabled: bool) -> Self {
        self.resolve_images = enabled;
        self
    }

    /// Disable every outbound lookup.
    pub fn offline(self) -> Self {
        self.with_reconciliation(false)
            .with_term_reconciliation(false)
            .with_image_resolution(false)
    }

    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Whether agents of this kind are sent to reconciliation.
    pub fn reconciles(&self, kind: AgentKind) -> bool {
        self.reconcile_agents && self.reconcile_kinds.contains(&kind)
    }

    /// Reject configurations a run cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::Config {
                reason: "batch_size must be greater than zero".to_string(),
            });
        }
        if url::Url::parse(&self.base_uri).is_err() {
            return Err(PipelineError::Config {
                reason: format!("base_uri is not an absolute URI: {}", self.base_uri),
            });
        }
        if url::Url::parse(&self.schema_uri).is_err() {
            return Err(PipelineError::Config {
                reason: format!("schema_uri is not an absolute URI: {}", self.schema_uri),
            });
        }
        if self.http.requests_per_second == 0 {
            return Err(PipelineError::Config {
                reason: "requests_per_second must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP client settings shared by every outbound lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout. Default: 20 seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Sustained request rate for the rate-limited transport. Default: 5.
    pub requests_per_second: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: "HeritageGraph/0.1 (heritage record reconciliation)".to_string(),
            requests_per_second: 5,
        }
    }
}

impl HttpConfig {
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps;
        self
    }
}

/// External endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// General knowledge-base SPARQL endpoint
    pub knowledge_base_sparql: String,

    /// Controlled-vocabulary thesaurus SPARQL endpoint
    pub thesaurus_sparql: String,

    /// Encyclopedia API (page thumbnails)
    pub encyclopedia_api: String,

    /// HTML image search results page
    pub image_search: String,

    /// Media repository API (file search)
    pub media_repository_api: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            knowledge_base_sparql: "https://query.wikidata.org/sparql".to_string(),
            thesaurus_sparql: "http://vocab.getty.edu/sparql.json".to_string(),
            encyclopedia_api: "https://en.wikipedia.org/w/api.php".to_string(),
            image_search: "https://www.google.com/search".to_string(),
            media_repository_api: "https://commons.wikimedia.org/w/api.php".to_string(),
        }
    }
}
