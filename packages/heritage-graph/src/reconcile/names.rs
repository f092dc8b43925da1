//! Search-label cleanup before reconciliation.
//!
//! Source names are written for catalog display, not search: artists appear
//! as "Family, Given" and museums carry a trailing county code.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::agent::AgentKind;

/// Trailing " - XX" county code, Romanian capitals included.
static COUNTY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*-\s*[A-ZȘȚÂÎĂŞŢ]{1,2}\s*$").expect("static county suffix pattern")
});

/// Label to search the authorities with for an agent of `kind`.
pub fn search_label(kind: AgentKind, name: &str) -> String {
    let cleaned = match kind {
        AgentKind::Artist => flip_family_given(name),
        AgentKind::Museum | AgentKind::Organization => strip_county(name),
        _ => name.trim().to_string(),
    };
    cleaned.replace('"', "").trim().to_string()
}

/// `"Grigorescu, Nicolae"` becomes `"Nicolae Grigorescu"`.
fn flip_family_given(name: &str) -> String {
    let mut parts = name.split(',').map(str::trim);
    match (parts.next(), parts.next()) {
        (Some(family), Some(given)) if !family.is_empty() && !given.is_empty() => {
            format!("{given} {family}")
        }
        _ => name.trim().to_string(),
    }
}

fn strip_county(name: &str) -> String {
    let stripped = COUNTY_SUFFIX.replace(name, "");
    if stripped.len() != name.len() {
        return stripped.trim().to_string();
    }
    match name.split_once(" - ") {
        Some((head, _)) => head.trim().to_string(),
        None => name.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_name_flipped() {
        assert_eq!(
            search_label(AgentKind::Artist, "Grigorescu, Nicolae"),
            "Nicolae Grigorescu"
        );
        assert_eq!(search_label(AgentKind::Artist, " Rembrandt "), "Rembrandt");
        assert_eq!(search_label(AgentKind::Artist, "Anonim,"), "Anonim,");
    }

    #[test]
    fn test_museum_county_code_dropped() {
        assert_eq!(
            search_label(AgentKind::Museum, "Muzeul Național de Artă - B"),
            "Muzeul Național de Artă"
        );
        assert_eq!(
            search_label(AgentKind::Museum, "Muzeul Județean-ȘT"),
            "Muzeul Județean"
        );
    }

    #[test]
    fn test_museum_falls_back_to_first_separator() {
        assert_eq!(
            search_label(AgentKind::Museum, "Muzeul Brukenthal - Galeria de Artă"),
            "Muzeul Brukenthal"
        );
        assert_eq!(search_label(AgentKind::Museum, "Louvre"), "Louvre");
    }

    #[test]
    fn test_quotes_removed() {
        assert_eq!(
            search_label(AgentKind::Museum, r#"Muzeul "Casa Mureșenilor""#),
            "Muzeul Casa Mureșenilor"
        );
    }
}
