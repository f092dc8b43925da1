//! Identifier minting and the run-scoped dedup context.
//!
//! Every resource URI is the base URI, a path prefix and a token minted from
//! a natural-language label. Minting is a pure function, so the same label
//! yields the same URI within and across runs. Whether an agent's own
//! attributes were already written is tracked separately, in a
//! [`RunContext`] owned by one run.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::types::agent::AgentKind;
use crate::types::term::TermKind;

/// Separator replacing each run of non-alphanumeric characters.
pub const SEPARATOR: char = '_';

/// Normalize a label into an identifier token.
///
/// Diacritics are folded to base letters, the result is lower-cased, every
/// maximal run of characters outside `[a-z0-9]` becomes one `_`, and leading
/// or trailing separators are trimmed. A label with no ASCII alphanumeric
/// content left after folding is hashed instead so it still gets a stable
/// token.
pub fn mint_token(label: &str) -> String {
    let mut folded = String::with_capacity(label.len());
    for c in label
        .trim()
        .nfkd()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
    {
        match fold_letter(c) {
            Some(base) => folded.push_str(base),
            None => folded.push(c),
        }
    }

    let mut token = String::with_capacity(folded.len());
    let mut pending_separator = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !token.is_empty() {
                token.push(SEPARATOR);
            }
            pending_separator = false;
            token.push(c);
        } else {
            pending_separator = true;
        }
    }

    if token.is_empty() {
        return hashed_token(label);
    }
    token
}

/// Lower-case Latin letters with no canonical decomposition.
fn fold_letter(c: char) -> Option<&'static str> {
    let base = match c {
        'ł' => "l",
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        'ħ' => "h",
        'ı' => "i",
        'ŧ' => "t",
        'ŋ' => "n",
        'ĸ' => "k",
        _ => return None,
    };
    Some(base)
}

fn hashed_token(label: &str) -> String {
    let digest = Sha256::digest(label.trim().as_bytes());
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("h{hex}")
}

/// Mints resource URIs under one base URI.
#[derive(Debug, Clone)]
pub struct IdentityMinter {
    base_uri: String,
}

impl IdentityMinter {
    pub fn new(base_uri: impl Into<String>) -> Self {
        let mut base_uri = base_uri.into();
        if !base_uri.ends_with('/') && !base_uri.ends_with('#') {
            base_uri.push('/');
        }
        Self { base_uri }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// `.../artwork/<token>`
    pub fn artwork_uri(&self, id: &str) -> String {
        format!("{}artwork/{}", self.base_uri, mint_token(id))
    }

    /// `.../activity/creation_<token>`
    pub fn creation_uri(&self, id: &str) -> String {
        format!("{}activity/creation_{}", self.base_uri, mint_token(id))
    }

    /// `.../activity/event_<token>_<n>`, `n` counting from 1.
    pub fn event_uri(&self, id: &str, n: usize) -> String {
        format!("{}activity/event_{}_{n}", self.base_uri, mint_token(id))
    }

    /// Agent URI; the path prefix depends on the kind.
    pub fn agent_uri(&self, kind: AgentKind, label: &str) -> String {
        format!("{}{}{}", self.base_uri, kind.path_prefix(), mint_token(label))
    }

    /// `.../material/<token>` or `.../category/<token>`
    pub fn term_uri(&self, kind: TermKind, label: &str) -> String {
        format!("{}{}{}", self.base_uri, kind.path_prefix(), mint_token(label))
    }
}

/// Per-run record of which agents were described and which terms were
/// looked up.
///
/// Agents are keyed by URI alone. Kinds that mint under the same path
/// (artists, museums, organizations and transfer counterparties all live
/// under `agent/`) name the same node, so the first reference decides how it
/// is typed. Terms get one set per [`TermKind`]. Create a fresh context for
/// every run.
#[derive(Debug, Default)]
pub struct RunContext {
    agents: HashSet<String>,
    terms: HashMap<TermKind, HashSet<String>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an agent as written; `true` only the first time.
    pub fn first_write(&mut self, uri: &str) -> bool {
        if self.agents.contains(uri) {
            return false;
        }
        self.agents.insert(uri.to_string());
        true
    }

    pub fn is_written(&self, uri: &str) -> bool {
        self.agents.contains(uri)
    }

    /// Number of agents written so far.
    pub fn written_count(&self) -> usize {
        self.agents.len()
    }

    /// Mark a term as seen; `true` only the first time.
    pub fn first_term(&mut self, kind: TermKind, uri: &str) -> bool {
        let set = self.terms.entry(kind).or_default();
        if set.contains(uri) {
            return false;
        }
        set.insert(uri.to_string());
        true
    }

    /// Number of distinct terms seen so far, across kinds.
    pub fn term_count(&self) -> usize {
        self.terms.values().map(HashSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_folds_romanian_diacritics() {
        assert_eq!(mint_token("Muzeul Național"), "muzeul_national");
        assert_eq!(mint_token("Muzeul Naţional"), "muzeul_national");
        assert_eq!(mint_token("Ștefan Luchian"), "stefan_luchian");
        assert_eq!(mint_token("Brâncuși, Constantin"), "brancusi_constantin");
    }

    #[test]
    fn test_folds_letters_without_decomposition() {
        assert_eq!(mint_token("Łódź"), "lodz");
        assert_eq!(mint_token("Øresund"), "oresund");
        assert_eq!(mint_token("Đurić"), "duric");
        assert_eq!(mint_token("Straße"), "strasse");
        assert_eq!(mint_token("Æsir Œuvre"), "aesir_oeuvre");
        assert_eq!(mint_token("Þórður"), "thordur");
    }

    #[test]
    fn test_non_latin_script_is_hashed() {
        let token = mint_token("Иван Айвазовский");
        assert!(token.starts_with('h'));
        assert_eq!(token.len(), 13);
        // Latin parts survive, the rest separates
        assert_eq!(mint_token("Иван Popescu"), "popescu");
    }

    #[test]
    fn test_collapses_and_trims_separators() {
        assert_eq!(mint_token("  --Car   cu -- boi!! "), "car_cu_boi");
        assert_eq!(mint_token("RO-123/45"), "ro_123_45");
    }

    #[test]
    fn test_symbol_only_label_is_hashed() {
        let token = mint_token("???");
        assert!(token.starts_with('h'));
        assert_eq!(token.len(), 13);
        assert_eq!(token, mint_token("???"));
        assert_ne!(token, mint_token("!!!"));
    }

    #[test]
    fn test_uri_scheme() {
        let minter = IdentityMinter::new("http://arp.ro/resource");
        assert_eq!(minter.artwork_uri("RO-1"), "http://arp.ro/resource/artwork/ro_1");
        assert_eq!(
            minter.creation_uri("RO-1"),
            "http://arp.ro/resource/activity/creation_ro_1"
        );
        assert_eq!(
            minter.event_uri("Q12418", 2),
            "http://arp.ro/resource/activity/event_q12418_2"
        );
        assert_eq!(
            minter.agent_uri(AgentKind::Collector, "Ion Popescu"),
            "http://arp.ro/resource/agent/collector_ion_popescu"
        );
        assert_eq!(
            minter.agent_uri(AgentKind::Validator, "Ion Vasile"),
            "http://arp.ro/resource/validator/ion_vasile"
        );
    }

    #[test]
    fn test_first_write_wins_by_uri() {
        let mut ctx = RunContext::new();
        assert!(ctx.first_write("http://x/agent/a"));
        assert!(!ctx.first_write("http://x/agent/a"));
        assert!(ctx.first_write("http://x/registrar/a"));
        assert!(ctx.is_written("http://x/agent/a"));
        assert_eq!(ctx.written_count(), 2);

        // A fresh context starts empty
        assert!(RunContext::new().first_write("http://x/agent/a"));
    }

    #[test]
    fn test_terms_deduplicated_per_kind() {
        let minter = IdentityMinter::new("http://arp.ro/resource/");
        let material = minter.term_uri(TermKind::Material, "Ulei");
        assert_eq!(material, "http://arp.ro/resource/material/ulei");

        let mut ctx = RunContext::new();
        assert!(ctx.first_term(TermKind::Material, &material));
        assert!(!ctx.first_term(TermKind::Material, &material));
        assert!(ctx.first_term(TermKind::Category, &material));
        assert_eq!(ctx.term_count(), 2);
        assert_eq!(ctx.written_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_mint_is_deterministic(label in "\\PC{0,40}") {
            prop_assert_eq!(mint_token(&label), mint_token(&label));
        }

        #[test]
        fn prop_case_and_separator_invariant(words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..5)) {
            let spaced = words.join(" ");
            let dashed = format!("--{}--", words.join(" - ").to_uppercase());
            prop_assert_eq!(mint_token(&spaced), mint_token(&dashed));
        }

        #[test]
        fn prop_token_shape(label in "\\PC{0,40}") {
            let token = mint_token(&label);
            prop_assert!(!token.is_empty());
            prop_assert!(!token.starts_with(SEPARATOR));
            prop_assert!(!token.ends_with(SEPARATOR));
            prop_assert!(!token.contains("__"));
            prop_assert!(token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == SEPARATOR));
        }
    }
}
