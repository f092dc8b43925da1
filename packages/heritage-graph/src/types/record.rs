//! Flat field set extracted from one source record.
//!
//! Both sources (museum export and knowledge-base rows) produce an
//! [`ArtworkRecord`]. Missing optional text fields are empty strings, never
//! `None`, so downstream code only ever asks "is it empty".

use serde::{Deserialize, Serialize};

use crate::extract::provenance::ProvenanceEntry;

/// Which source a record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    #[default]
    MuseumExport,
    KnowledgeBase,
}

/// A dated, named stamp from the record metadata (`"date/name"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataStamp {
    pub date: String,
    pub name: String,
}

impl MetadataStamp {
    /// Split `"date/name"` on the first `/`.
    ///
    /// Text without a `/` yields an empty stamp.
    pub fn parse(text: &str) -> Self {
        match text.trim().split_once('/') {
            Some((date, name)) => Self {
                date: date.trim().to_string(),
                name: name.trim().to_string(),
            },
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_empty() && self.name.is_empty()
    }
}

/// One heritage object, flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    /// Source identifier; the artwork URI is minted from it
    pub id: String,

    pub source: RecordSource,

    pub title: String,

    /// Creating actors in source order; empty means unknown
    #[serde(default)]
    pub actors: Vec<String>,

    /// Free-text creation date as found in the source
    pub date: String,

    pub dimensions: String,
    pub description: String,
    pub inventory_number: String,
    pub condition: String,
    pub category: String,

    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub techniques: Vec<String>,
    #[serde(default)]
    pub classifications: Vec<String>,

    /// Culture terms, `value@lang` when the source carried a language
    #[serde(default)]
    pub cultures: Vec<String>,

    /// Direct image link from the source, if any
    pub image_link: String,

    /// Link to the source catalog entry
    pub catalog_link: String,

    /// Knowledge-base entity URI
    pub external_uri: String,

    /// License resource URI
    pub license: String,

    /// Holding institution
    pub museum: String,

    /// Organization that supplied the record
    pub source_organization: String,
    pub source_homepage: String,

    #[serde(default)]
    pub recorded: MetadataStamp,
    #[serde(default)]
    pub validated: MetadataStamp,

    /// Ownership history (anonymous ownership links)
    #[serde(default)]
    pub ownership: Vec<ProvenanceEntry>,

    /// Addressable custody-transfer events
    #[serde(default)]
    pub custody_events: Vec<ProvenanceEntry>,
}

impl ArtworkRecord {
    /// Create an empty record for a source identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actors.push(actor.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_museum(mut self, museum: impl Into<String>) -> Self {
        self.museum = museum.into();
        self
    }

    pub fn with_image_link(mut self, link: impl Into<String>) -> Self {
        self.image_link = link.into();
        self
    }

    /// Label used to search for an image when the source has none.
    pub fn image_query(&self) -> &str {
        self.title.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_splits_on_first_slash() {
        let stamp = MetadataStamp::parse(" 2014-02-02 / Ana Pop/Ionescu ");
        assert_eq!(stamp.date, "2014-02-02");
        assert_eq!(stamp.name, "Ana Pop/Ionescu");
    }

    #[test]
    fn test_stamp_without_slash_is_empty() {
        assert!(MetadataStamp::parse("2014-02-02").is_empty());
    }
}
