//! Material and category terms linked to thesaurus concepts.

use serde::{Deserialize, Serialize};

/// Kind of vocabulary term, used for identifier paths and dedup sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// Material or technique of a creation
    Material,
    /// Object category of an artwork
    Category,
}

impl TermKind {
    pub const ALL: [TermKind; 2] = [Self::Material, Self::Category];

    /// Resource path prefix, relative to the base URI.
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::Material => "material/",
            Self::Category => "category/",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Category => "category",
        }
    }
}

impl std::fmt::Display for TermKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A term concept as it is written to the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Minted resource URI
    pub uri: String,

    pub kind: TermKind,

    /// Concept label: the glossary entry the source term matched, or the
    /// source term itself
    pub label: String,

    /// English label known for the concept
    pub english: Option<String>,

    /// Thesaurus concept code (e.g. `300015050`), once reconciled
    pub code: Option<String>,
}

impl Term {
    /// Whether reconciliation found a concept code.
    pub fn is_reconciled(&self) -> bool {
        self.code.is_some()
    }
}
