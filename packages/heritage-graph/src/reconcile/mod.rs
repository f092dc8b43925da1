//! Agent reconciliation against external authorities.
//!
//! Two stages, in priority order:
//!
//! 1. Knowledge-base entity search. A hit records the entity URI, label and
//!    image; if the same row carries a thesaurus code the waterfall stops.
//! 2. Thesaurus full-text search, only when stage 1 produced no code. The
//!    first subject in the agent or place branch gives the short code.
//!
//! Material and category terms are linked to thesaurus concepts by
//! [`ReconciliationClient::reconcile_term`], see [`terms`].
//!
//! A failed or empty stage never aborts anything. Failures are logged at
//! `warn` and counted apart from genuine misses.
//!
//! # Example
//!
//! ```rust,ignore
//! use heritage_graph::reconcile::ReconciliationClient;
//! use heritage_graph::types::agent::AgentKind;
//!
//! let client = ReconciliationClient::new(transport, &config.endpoints);
//! if let Some(links) = client.resolve(AgentKind::Artist, "Grigorescu, Nicolae").await {
//!     println!("{:?}", links.external_uri);
//! }
//! ```

pub mod names;
pub mod queries;
pub mod terms;

pub use terms::TermReconciliation;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::images::normalize::normalize_image_url;
use crate::traits::transport::{HttpTransport, Lookup, StageOutcomes};
use crate::transports::sparql;
use crate::types::agent::{AgentKind, AuthorityLinks};
use crate::types::config::EndpointConfig;

/// Label substituted for an absent actor; never reconciled.
pub const UNKNOWN_AGENT: &str = "unknown";

/// Result of one reconciliation, with stage outcomes for the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub links: Option<AuthorityLinks>,
    pub outcomes: StageOutcomes,
}

/// Knowledge-base hit from stage 1.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntityMatch {
    uri: String,
    label: Option<String>,
    image: Option<String>,
    code: Option<String>,
}

pub struct ReconciliationClient {
    transport: Arc<dyn HttpTransport>,
    knowledge_base: String,
    thesaurus: String,
}

impl ReconciliationClient {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: &EndpointConfig) -> Self {
        Self {
            transport,
            knowledge_base: endpoints.knowledge_base_sparql.clone(),
            thesaurus: endpoints.thesaurus_sparql.clone(),
        }
    }

    /// Authority links for an agent name, if any stage found one.
    pub async fn resolve(&self, kind: AgentKind, name: &str) -> Option<AuthorityLinks> {
        self.reconcile(kind, name).await.links
    }

    /// Run the waterfall and report every stage outcome.
    pub async fn reconcile(&self, kind: AgentKind, name: &str) -> Reconciliation {
        let mut result = Reconciliation::default();

        let label = names::search_label(kind, name);
        if label.is_empty() || label.eq_ignore_ascii_case(UNKNOWN_AGENT) {
            return result;
        }

        let mut links = AuthorityLinks::default();

        let entity = self.search_knowledge_base(kind, &label).await;
        result.outcomes.record(&entity);
        log_stage("knowledge_base", &label, &entity);
        if let Lookup::Found(hit) = entity {
            links.external_uri = Some(hit.uri);
            links.external_label = hit.label;
            links.image_url = hit.image.map(|url| normalize_image_url(&url));
            if let Some(code) = hit.code {
                links.authority_uri = Some(format!("{}{code}", queries::THESAURUS_BRANCHES[0]));
                links.authority_code = Some(code);
            }
        }

        if links.authority_code.is_none() {
            let subject = self.search_thesaurus(&label).await;
            result.outcomes.record(&subject);
            log_stage("thesaurus", &label, &subject);
            if let Lookup::Found(uri) = subject {
                links.authority_code = queries::authority_code(&uri).map(str::to_string);
                links.authority_uri = Some(uri);
            }
        }

        if !links.is_empty() {
            result.links = Some(links);
        }
        result
    }

    async fn search_knowledge_base(&self, kind: AgentKind, label: &str) -> Lookup<EntityMatch> {
        let query = queries::render(queries::knowledge_base_template(kind), label);
        let row = sparql::select_first(self.transport.as_ref(), &self.knowledge_base, &query).await;

        Lookup::from_result(row.map(|row| {
            row.and_then(|row| {
                let uri = row.uri("item")?.to_string();
                Some(EntityMatch {
                    uri,
                    label: row.get("itemLabel").map(str::to_string),
                    image: row.get("image").map(str::to_string),
                    code: row.get("ulan").map(str::to_string),
                })
            })
        }))
    }

    async fn search_thesaurus(&self, label: &str) -> Lookup<String> {
        let query = queries::render(queries::THESAURUS_QUERY, label);
        let row = sparql::select_first(self.transport.as_ref(), &self.thesaurus, &query).await;

        Lookup::from_result(row.map(|row| {
            row.and_then(|row| row.uri("subject").map(str::to_string))
                .filter(|uri| queries::authority_code(uri).is_some())
        }))
    }
}

fn log_stage<T>(stage: &str, label: &str, lookup: &Lookup<T>) {
    match lookup {
        Lookup::TransportError(detail) => {
            warn!(stage, label, error = %detail, "Reconciliation lookup failed");
        }
        _ => debug!(stage, label, outcome = lookup.outcome(), "Reconciliation stage"),
    }
}
