//! Material and category reconciliation.
//!
//! Source terms are mostly free text such as `ulei pe pânză`. A glossary of
//! common material words maps a term to a canonical entry with a known
//! English label, and that entry becomes the concept. Other terms are
//! looked up under their own label.
//!
//! A single stage: one knowledge-base query for an item that carries a
//! thesaurus concept code and whose label equals one of the candidates.

use crate::pipeline::identity::IdentityMinter;
use crate::traits::transport::{Lookup, StageOutcomes};
use crate::transports::sparql;
use crate::types::term::{Term, TermKind};

use super::{log_stage, queries, ReconciliationClient};

/// Material words and their English labels.
pub const GLOSSARY: &[(&str, &str)] = &[
    ("ulei", "oil painting"),
    ("creion", "pencil"),
    ("acuarel", "watercolor"),
    ("sanguină", "red chalk"),
    ("peniță", "pen"),
    ("tuș", "ink"),
    ("lemn", "wood"),
    ("bronz", "bronze"),
    ("marmură", "marble"),
    ("teracotă", "terracotta"),
    ("sticlă", "glass"),
    ("pastel", "pastel"),
    ("tempera", "tempera"),
    ("grafit", "graphite"),
    ("piatră prețioasă", "gemstone"),
    ("oglindă", "mirror"),
    ("chihlimbar", "amber"),
    ("argint", "silver"),
    ("gazar", "gazar"),
    ("organza", "organza"),
    ("tul", "tulle"),
    ("dantelă", "lace"),
    ("satin", "satin"),
    ("pergament", "parchment"),
    ("beton", "concrete"),
    ("hârtie", "paper"),
    ("lut", "clay"),
    ("gresie", "sandstone"),
    ("cuarț", "quartz"),
];

/// Result of one term reconciliation, with stage outcomes for the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermReconciliation {
    pub code: Option<String>,
    pub outcomes: StageOutcomes,
}

/// The glossary entry a term names.
///
/// An exact match wins. Otherwise the first entry that starts a word of the
/// term, so `acuarel` matches `acuarelă pe hârtie`.
pub fn glossary_entry(term: &str) -> Option<(&'static str, &'static str)> {
    let term = term.trim().to_lowercase();
    if let Some(entry) = GLOSSARY.iter().find(|(word, _)| *word == term) {
        return Some(*entry);
    }

    let words = term
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .fold(String::new(), |mut acc, w| {
            acc.push(' ');
            acc.push_str(w);
            acc
        });
    GLOSSARY
        .iter()
        .find(|(word, _)| words.contains(&format!(" {word}")))
        .copied()
}

/// The concept a source term stands for. Only materials use the glossary.
pub fn concept(minter: &IdentityMinter, kind: TermKind, source: &str) -> Term {
    let entry = match kind {
        TermKind::Material => glossary_entry(source),
        TermKind::Category => None,
    };
    let (label, english) = match entry {
        Some((word, english)) => (word.to_string(), Some(english.to_string())),
        None => (source.trim().to_lowercase(), None),
    };

    Term {
        uri: minter.term_uri(kind, &label),
        kind,
        label,
        english,
        code: None,
    }
}

fn is_concept_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

impl ReconciliationClient {
    /// Look up the thesaurus concept code of a term.
    pub async fn reconcile_term(&self, term: &Term) -> TermReconciliation {
        let mut result = TermReconciliation::default();
        if term.label.trim().is_empty() {
            return result;
        }

        let label = term.label.as_str();
        let english = term.english.as_deref().unwrap_or(label);
        let labels = [(english, "en"), (label, "ro")];

        let query = queries::render_labels(queries::TERM_QUERY, &labels);
        let row = sparql::select_first(self.transport.as_ref(), &self.knowledge_base, &query).await;
        let lookup = Lookup::from_result(row.map(|row| {
            row.and_then(|row| row.get("aatID").map(str::to_string))
                .filter(|code| is_concept_code(code))
        }));

        result.outcomes.record(&lookup);
        log_stage(term.kind.as_str(), &term.label, &lookup);
        if let Lookup::Found(code) = lookup {
            result.code = Some(code);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sparql_results, MockTransport};
    use crate::types::config::EndpointConfig;
    use std::sync::Arc;

    fn minter() -> IdentityMinter {
        IdentityMinter::new("http://arp.ro/resource/")
    }

    fn client(transport: &Arc<MockTransport>) -> ReconciliationClient {
        ReconciliationClient::new(transport.clone(), &EndpointConfig::default())
    }

    #[test]
    fn test_glossary_matches_word_starts() {
        assert_eq!(glossary_entry("Ulei"), Some(("ulei", "oil painting")));
        assert_eq!(glossary_entry("ulei pe pânză"), Some(("ulei", "oil painting")));
        assert_eq!(glossary_entry("acuarelă pe hârtie"), Some(("acuarel", "watercolor")));
        assert_eq!(glossary_entry("piatră prețioasă"), Some(("piatră prețioasă", "gemstone")));
        // `tul` only matches at a word start
        assert_eq!(glossary_entry("natural"), None);
    }

    #[test]
    fn test_concept_uses_glossary_for_materials_only() {
        let material = concept(&minter(), TermKind::Material, "Ulei pe pânză");
        assert_eq!(material.uri, "http://arp.ro/resource/material/ulei");
        assert_eq!(material.label, "ulei");
        assert_eq!(material.english.as_deref(), Some("oil painting"));

        let category = concept(&minter(), TermKind::Category, "Pictură");
        assert_eq!(category.uri, "http://arp.ro/resource/category/pictura");
        assert_eq!(category.label, "pictură");
        assert_eq!(category.english, None);
    }

    #[tokio::test]
    async fn test_code_found_through_english_label() {
        let transport = Arc::new(
            MockTransport::new().with_response("P1014", sparql_results(&[&[("aatID", "300015050")]])),
        );
        let term = concept(&minter(), TermKind::Material, "ulei");

        let result = client(&transport).reconcile_term(&term).await;

        assert_eq!(result.code.as_deref(), Some("300015050"));
        assert_eq!(result.outcomes, StageOutcomes::default());
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].url.contains("oil+painting"));
    }

    #[tokio::test]
    async fn test_miss_failure_and_bad_code() {
        let missing = Arc::new(MockTransport::new().with_response("P1014", sparql_results(&[])));
        let failing = Arc::new(MockTransport::new().with_failure("P1014"));
        let garbage = Arc::new(
            MockTransport::new().with_response("P1014", sparql_results(&[&[("aatID", "n/a")]])),
        );
        let term = concept(&minter(), TermKind::Category, "sculptură");

        let result = client(&missing).reconcile_term(&term).await;
        assert_eq!(result.code, None);
        assert_eq!(result.outcomes.not_found, 1);

        let result = client(&failing).reconcile_term(&term).await;
        assert_eq!(result.code, None);
        assert_eq!(result.outcomes.failed, 1);

        let result = client(&garbage).reconcile_term(&term).await;
        assert_eq!(result.code, None);
        assert_eq!(result.outcomes.not_found, 1);
    }
}
