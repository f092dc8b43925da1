//! In-memory graph fragments.
//!
//! The assembler never writes text directly. It builds [`Description`]s, each
//! one subject with an ordered list of predicate statements, and the
//! serializer in [`turtle`] joins them. Keeping statements as a list means the
//! closing mark of a description is produced by a join, never by trimming a
//! trailing separator off a buffer.
//!
//! - [`vocab`] - Namespace prefixes and predicate names
//! - [`turtle`] - Turtle serialization

pub mod turtle;
pub mod vocab;

use serde::{Deserialize, Serialize};

/// Datatypes used for typed literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datatype {
    /// Full calendar date (`xsd:date`)
    Date,
    /// Bare year, possibly signed (`xsd:gYear`)
    GYear,
    /// URI carried as a literal (`xsd:anyURI`)
    AnyUri,
}

impl Datatype {
    /// Prefixed datatype name.
    pub fn prefixed(&self) -> &'static str {
        match self {
            Self::Date => "xsd:date",
            Self::GYear => "xsd:gYear",
            Self::AnyUri => "xsd:anyURI",
        }
    }
}

/// Object position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Object {
    /// Absolute IRI
    Iri(String),

    /// Prefixed name from the fixed prefix set (e.g. `arp:Artist`)
    Name(String),

    /// Plain string literal
    Plain(String),

    /// Language-tagged literal
    Lang { value: String, lang: String },

    /// Typed literal
    Typed { value: String, datatype: Datatype },

    /// Anonymous node with its own statements
    Blank(Vec<Statement>),
}

impl Object {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Self::Plain(value.into())
    }

    pub fn typed(value: impl Into<String>, datatype: Datatype) -> Self {
        Self::Typed {
            value: value.into(),
            datatype,
        }
    }

    /// Literal with an optional language tag; a blank or malformed tag
    /// yields a plain literal.
    pub fn lang(value: impl Into<String>, lang: Option<&str>) -> Self {
        match lang.map(str::trim).filter(|l| turtle::is_language_tag(l)) {
            Some(lang) => Self::Lang {
                value: value.into(),
                lang: lang.to_string(),
            },
            None => Self::Plain(value.into()),
        }
    }
}

/// One predicate-object pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Prefixed predicate name, or `a` for the type predicate
    pub predicate: String,
    pub object: Object,
}

impl Statement {
    pub fn new(predicate: impl Into<String>, object: Object) -> Self {
        Self {
            predicate: predicate.into(),
            object,
        }
    }
}

/// A subject and its ordered statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Absolute subject IRI
    pub subject: String,
    pub statements: Vec<Statement>,
}

impl Description {
    /// Create a description typed with the given class.
    pub fn typed(subject: impl Into<String>, class: &str) -> Self {
        Self {
            subject: subject.into(),
            statements: vec![Statement::new(vocab::A, Object::name(class))],
        }
    }

    /// Append a statement.
    pub fn push(&mut self, predicate: &str, object: Object) -> &mut Self {
        self.statements.push(Statement::new(predicate, object));
        self
    }

    /// Append a plain literal, skipping blank values.
    pub fn push_text(&mut self, predicate: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() {
            self.push(predicate, Object::plain(value));
        }
        self
    }

    /// Append a typed literal, skipping blank values.
    pub fn push_typed(&mut self, predicate: &str, value: &str, datatype: Datatype) -> &mut Self {
        let value = value.trim();
        if !value.is_empty() {
            self.push(predicate, Object::typed(value, datatype));
        }
        self
    }

    /// Append an IRI reference.
    pub fn push_iri(&mut self, predicate: &str, iri: impl Into<String>) -> &mut Self {
        self.push(predicate, Object::iri(iri))
    }

    /// Statements excluding the type statement.
    pub fn attributes(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| s.predicate != vocab::A)
    }

    /// Objects of every statement with the given predicate.
    pub fn objects<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Object> {
        self.statements
            .iter()
            .filter(move |s| s.predicate == predicate)
            .map(|s| &s.object)
    }

    /// Number of triples this description serializes to, blank nodes included.
    pub fn triple_count(&self) -> usize {
        fn count(statements: &[Statement]) -> usize {
            statements
                .iter()
                .map(|s| match &s.object {
                    Object::Blank(inner) => 1 + count(inner),
                    _ => 1,
                })
                .sum()
        }
        count(&self.statements)
    }
}

/// The descriptions assembled for one source record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgraph {
    pub descriptions: Vec<Description>,
}

impl Subgraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, description: Description) {
        if !description.statements.is_empty() {
            self.descriptions.push(description);
        }
    }

    /// Find the description for a subject.
    pub fn get(&self, subject: &str) -> Option<&Description> {
        self.descriptions.iter().find(|d| d.subject == subject)
    }

    /// Count descriptions carrying the given type.
    pub fn count_typed(&self, class: &str) -> usize {
        self.descriptions
            .iter()
            .filter(|d| d.objects(vocab::A).any(|o| *o == Object::name(class)))
            .count()
    }

    pub fn triple_count(&self) -> usize {
        self.descriptions.iter().map(Description::triple_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_text_skips_blank() {
        let mut d = Description::typed("http://x/artwork/1", vocab::ARTWORK);
        d.push_text(vocab::TITLE, "  ").push_text(vocab::TITLE, " Ion ");

        assert_eq!(d.statements.len(), 2);
        assert_eq!(d.statements[1].object, Object::plain("Ion"));
    }

    #[test]
    fn test_lang_blank_tag_is_plain() {
        assert_eq!(Object::lang("dacian", Some(" ")), Object::plain("dacian"));
        assert!(matches!(Object::lang("dacian", Some("ro")), Object::Lang { .. }));
        assert_eq!(Object::lang("dacian", Some("123")), Object::plain("dacian"));
    }

    #[test]
    fn test_triple_count_includes_blank_nodes() {
        let mut d = Description::typed("http://x/artwork/1", vocab::ARTWORK);
        d.push(
            vocab::HAS_OWNERSHIP,
            Object::Blank(vec![
                Statement::new(vocab::A, Object::name(vocab::TRANSFER_OF_CUSTODY)),
                Statement::new(vocab::WAS_ASSOCIATED_WITH, Object::iri("http://x/agent/a")),
            ]),
        );

        assert_eq!(d.triple_count(), 4);
    }

    #[test]
    fn test_subgraph_drops_empty_descriptions() {
        let mut g = Subgraph::new();
        g.push(Description {
            subject: "http://x/a".into(),
            statements: vec![],
        });
        assert!(g.is_empty());
    }
}
