//! Agent variants and authority links.

use serde::{Deserialize, Serialize};

use crate::graph::vocab;

/// Kind of agent, used for identifier paths, dedup sets and config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Artist,
    Museum,
    Organization,
    Registrar,
    Validator,
    Collector,
    /// Counterparty of a custody transfer whose nature is not known
    Agent,
}

impl AgentKind {
    /// Every kind, in a stable order.
    pub const ALL: [AgentKind; 7] = [
        Self::Artist,
        Self::Museum,
        Self::Organization,
        Self::Registrar,
        Self::Validator,
        Self::Collector,
        Self::Agent,
    ];

    /// Class the agent is typed with.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Artist => vocab::ARTIST,
            Self::Museum => vocab::MUSEUM,
            Self::Organization => vocab::ORGANIZATION,
            Self::Registrar => vocab::REGISTRAR,
            Self::Validator => vocab::VALIDATOR,
            Self::Collector => vocab::COLLECTOR,
            Self::Agent => vocab::AGENT,
        }
    }

    /// Resource path prefix, relative to the base URI.
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::Registrar => "registrar/",
            Self::Validator => "validator/",
            Self::Collector => "agent/collector_",
            Self::Artist | Self::Museum | Self::Organization | Self::Agent => "agent/",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Museum => "museum",
            Self::Organization => "organization",
            Self::Registrar => "registrar",
            Self::Validator => "validator",
            Self::Collector => "collector",
            Self::Agent => "agent",
        }
    }

    /// Whether the knowledge base should be searched for a person rather
    /// than an institution.
    pub fn is_person(&self) -> bool {
        matches!(
            self,
            Self::Artist | Self::Registrar | Self::Validator | Self::Collector
        )
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Links to external authorities found by reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityLinks {
    /// Knowledge-base entity URI
    pub external_uri: Option<String>,

    /// Knowledge-base entity label
    pub external_label: Option<String>,

    /// Controlled-vocabulary short code (e.g. `500010879`)
    pub authority_code: Option<String>,

    /// Controlled-vocabulary subject URI
    pub authority_uri: Option<String>,

    /// Representative image, already normalized
    pub image_url: Option<String>,
}

impl AuthorityLinks {
    pub fn is_empty(&self) -> bool {
        self.external_uri.is_none() && self.authority_code.is_none()
    }
}

/// Variant-specific part of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentVariant {
    Artist,
    Museum,
    Organization {
        homepage: Option<String>,
        /// URI of the museum the organization acts for
        acted_on_behalf_of: Option<String>,
    },
    Registrar,
    Validator,
    Collector,
    Agent,
}

impl AgentVariant {
    pub fn kind(&self) -> AgentKind {
        match self {
            Self::Artist => AgentKind::Artist,
            Self::Museum => AgentKind::Museum,
            Self::Organization { .. } => AgentKind::Organization,
            Self::Registrar => AgentKind::Registrar,
            Self::Validator => AgentKind::Validator,
            Self::Collector => AgentKind::Collector,
            Self::Agent => AgentKind::Agent,
        }
    }

    /// The fieldless variant for a kind.
    pub fn plain(kind: AgentKind) -> Self {
        match kind {
            AgentKind::Artist => Self::Artist,
            AgentKind::Museum => Self::Museum,
            AgentKind::Organization => Self::Organization {
                homepage: None,
                acted_on_behalf_of: None,
            },
            AgentKind::Registrar => Self::Registrar,
            AgentKind::Validator => Self::Validator,
            AgentKind::Collector => Self::Collector,
            AgentKind::Agent => Self::Agent,
        }
    }
}

/// An agent as it is written to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Minted resource URI
    pub uri: String,

    /// Name exactly as it appeared in the source
    pub name: String,

    pub variant: AgentVariant,

    #[serde(default)]
    pub links: AuthorityLinks,
}

impl Agent {
    pub fn kind(&self) -> AgentKind {
        self.variant.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefixes() {
        assert_eq!(AgentKind::Artist.path_prefix(), "agent/");
        assert_eq!(AgentKind::Registrar.path_prefix(), "registrar/");
        assert_eq!(AgentKind::Collector.path_prefix(), "agent/collector_");
    }

    #[test]
    fn test_variant_round_trips_kind() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentVariant::plain(kind).kind(), kind);
        }
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&AgentKind::Museum).unwrap();
        assert_eq!(json, "\"museum\"");
    }
}
