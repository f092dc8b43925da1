//! Delimited encoding of ownership and custody-transfer history.
//!
//! A history is one string: entries separated by `;;`, fields within an entry
//! separated by `||`. Fields are positional:
//!
//! ```text
//! agent || start || end [|| location [|| from [|| to]]]
//! ```
//!
//! The first three positions are always written. Trailing optional positions
//! are written only up to the last present one. An empty field decodes to
//! `None`.

use serde::{Deserialize, Serialize};

/// Separator between entries.
pub const RECORD_DELIMITER: &str = ";;";

/// Separator between fields of one entry.
pub const FIELD_DELIMITER: &str = "||";

/// One ownership or custody-transfer entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Owner name for ownership history; the event label (e.g. `theft`)
    /// for a custody event
    pub agent: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ProvenanceEntry {
    /// Entry with only an agent name.
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = non_blank(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = non_blank(end.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = non_blank(from.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = non_blank(to.into());
        self
    }

    fn encode(&self) -> String {
        let optional = [&self.location, &self.from, &self.to];
        let tail = optional
            .iter()
            .rposition(|f| f.is_some())
            .map_or(0, |last| last + 1);

        let mut fields = vec![
            clean(&self.agent),
            self.start.as_deref().map(clean).unwrap_or_default(),
            self.end.as_deref().map(clean).unwrap_or_default(),
        ];
        fields.extend(
            optional[..tail]
                .iter()
                .map(|f| f.as_deref().map(clean).unwrap_or_default()),
        );
        fields.join(FIELD_DELIMITER)
    }

    fn decode(raw: &str) -> Option<Self> {
        let mut fields = raw.split(FIELD_DELIMITER).map(|f| non_blank(f.to_string()));
        let agent = fields.next().flatten()?;
        Some(Self {
            agent,
            start: fields.next().flatten(),
            end: fields.next().flatten(),
            location: fields.next().flatten(),
            from: fields.next().flatten(),
            to: fields.next().flatten(),
        })
    }
}

/// Encode a history. Entries with a blank agent are dropped.
pub fn encode_history(entries: &[ProvenanceEntry]) -> String {
    entries
        .iter()
        .filter(|e| !e.agent.trim().is_empty())
        .map(ProvenanceEntry::encode)
        .collect::<Vec<_>>()
        .join(RECORD_DELIMITER)
}

/// Decode a history. Entries without an agent are skipped.
pub fn decode_history(raw: &str) -> Vec<ProvenanceEntry> {
    raw.split(RECORD_DELIMITER)
        .filter_map(ProvenanceEntry::decode)
        .collect()
}

/// Order entries by start ascending; unknown starts go last.
///
/// Stable, so entries with equal or unknown starts keep source order.
pub fn sort_by_start(entries: &mut [ProvenanceEntry]) {
    entries.sort_by(|a, b| match (&a.start, &b.start) {
        (Some(x), Some(y)) => start_key(x).cmp(&start_key(y)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Sortable key: signed year first, then the remaining text.
fn start_key(start: &str) -> (i64, String) {
    let year = crate::extract::dates::extract_year(start)
        .and_then(|y| y.parse::<i64>().ok())
        .unwrap_or(i64::MAX);
    (year, start.trim().to_string())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Replace delimiter characters inside a field so encoding stays reversible.
fn clean(value: &str) -> String {
    value.trim().replace(';', ",").replace('|', "/")
}
