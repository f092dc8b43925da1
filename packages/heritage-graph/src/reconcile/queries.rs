//! Reconciliation query templates.
//!
//! Agent templates carry a `{{LABEL}}` placeholder that [`render`] fills
//! with an escaped label. The term template carries `{{LABELS}}`, filled by
//! [`render_labels`] with a list of language-tagged literals.

use crate::transports::sparql::escape_label;
use crate::types::agent::AgentKind;

const LABEL: &str = "{{LABEL}}";
const LABELS: &str = "{{LABELS}}";

/// Knowledge-base search for a person.
pub const PERSON_QUERY: &str = r#"PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX wikibase: <http://wikiba.se/ontology#>
PREFIX bd: <http://www.bigdata.com/rdf#>
PREFIX mwapi: <https://www.mediawiki.org/ontology#API/>
SELECT ?item ?itemLabel ?image ?ulan WHERE {
  SERVICE wikibase:mwapi {
    bd:serviceParam wikibase:endpoint "www.wikidata.org" ;
                    wikibase:api "EntitySearch" ;
                    mwapi:search "{{LABEL}}" ;
                    mwapi:language "en" .
    ?item wikibase:apiOutputItem mwapi:item .
    ?num wikibase:apiOrdinal true .
  }
  ?item wdt:P31 wd:Q5 .
  OPTIONAL { ?item wdt:P18 ?image }
  OPTIONAL { ?item wdt:P245 ?ulan }
  SERVICE wikibase:label { bd:serviceParam wikibase:language "ro,en" . }
}
ORDER BY ?num
LIMIT 1"#;

/// Knowledge-base search for a museum or other institution.
pub const INSTITUTION_QUERY: &str = r#"PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX wikibase: <http://wikiba.se/ontology#>
PREFIX bd: <http://www.bigdata.com/rdf#>
PREFIX mwapi: <https://www.mediawiki.org/ontology#API/>
SELECT ?item ?itemLabel ?image ?ulan WHERE {
  SERVICE wikibase:mwapi {
    bd:serviceParam wikibase:endpoint "www.wikidata.org" ;
                    wikibase:api "EntitySearch" ;
                    mwapi:search "{{LABEL}}" ;
                    mwapi:language "ro" .
    ?item wikibase:apiOutputItem mwapi:item .
    ?num wikibase:apiOrdinal true .
  }
  ?item wdt:P31/wdt:P279* wd:Q43229 .
  OPTIONAL { ?item wdt:P18 ?image }
  OPTIONAL { ?item wdt:P245 ?ulan }
  SERVICE wikibase:label { bd:serviceParam wikibase:language "ro,en" . }
}
ORDER BY ?num
LIMIT 1"#;

/// Thesaurus full-text search, limited to the agent and place branches.
pub const THESAURUS_QUERY: &str = r#"PREFIX luc: <http://www.ontotext.com/owlim/lucene#>
PREFIX gvp: <http://vocab.getty.edu/ontology#>
SELECT ?subject WHERE {
  ?subject luc:term "{{LABEL}}" ;
           a gvp:Subject .
  FILTER (REGEX(STR(?subject), "/(ulan|tgn)/"))
}
LIMIT 1"#;

/// Knowledge-base lookup of a term's concept code in the thesaurus
/// (`P1014`), matching any of the candidate labels exactly.
pub const TERM_QUERY: &str = r#"PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?aatID WHERE {
  VALUES ?label { {{LABELS}} }
  ?item rdfs:label ?label ;
        wdt:P1014 ?aatID .
}
LIMIT 1"#;

/// Namespace of thesaurus concept codes.
pub const CONCEPT_NAMESPACE: &str = "http://vocab.getty.edu/aat/";

/// Branch prefixes stripped to derive a short authority code.
pub const THESAURUS_BRANCHES: [&str; 2] = [
    "http://vocab.getty.edu/ulan/",
    "http://vocab.getty.edu/tgn/",
];

/// Knowledge-base template for an agent kind.
pub fn knowledge_base_template(kind: AgentKind) -> &'static str {
    if kind.is_person() {
        PERSON_QUERY
    } else {
        INSTITUTION_QUERY
    }
}

/// Substitute an escaped label into a template.
pub fn render(template: &str, label: &str) -> String {
    template.replace(LABEL, &escape_label(label))
}

/// Substitute `(label, language)` pairs into a template as tagged literals.
pub fn render_labels(template: &str, labels: &[(&str, &str)]) -> String {
    let values = labels
        .iter()
        .map(|(label, lang)| format!("\"{}\"@{lang}", escape_label(label)))
        .collect::<Vec<_>>()
        .join(" ");
    template.replace(LABELS, &values)
}

/// Short code of a thesaurus subject URI; `None` outside both branches.
pub fn authority_code(subject: &str) -> Option<&str> {
    THESAURUS_BRANCHES
        .iter()
        .find_map(|prefix| subject.strip_prefix(prefix))
        .map(str::trim)
        .filter(|code| !code.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_quotes() {
        let query = render(THESAURUS_QUERY, r#"The "Blue" Boy"#);
        assert!(query.contains(r#"luc:term "The \"Blue\" Boy""#));
        assert!(!query.contains(LABEL));
    }

    #[test]
    fn test_render_labels_as_tagged_values() {
        let query = render_labels(TERM_QUERY, &[("oil painting", "en"), ("ulei", "ro")]);
        assert!(query.contains(r#"VALUES ?label { "oil painting"@en "ulei"@ro }"#));
        assert!(!query.contains(LABELS));
    }

    #[test]
    fn test_template_by_kind() {
        assert_eq!(knowledge_base_template(AgentKind::Artist), PERSON_QUERY);
        assert_eq!(knowledge_base_template(AgentKind::Museum), INSTITUTION_QUERY);
        assert_eq!(
            knowledge_base_template(AgentKind::Organization),
            INSTITUTION_QUERY
        );
    }

    #[test]
    fn test_authority_code() {
        assert_eq!(
            authority_code("http://vocab.getty.edu/ulan/500010879"),
            Some("500010879")
        );
        assert_eq!(authority_code("http://vocab.getty.edu/tgn/7008038"), Some("7008038"));
        assert_eq!(authority_code("http://vocab.getty.edu/aat/300015050"), None);
    }
}
