//! Date shape classification.
//!
//! Source dates are free text. Before encoding, each one is classified as a
//! full calendar date, a (possibly BCE) year, or unrecognized text, which
//! stays a plain string.

use crate::graph::{Datatype, Object};

/// Shape of a source date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateShape {
    /// `YYYY-MM-DD`
    FullDate(String),
    /// `YYYY` or `-YYYY`, sign retained
    Year(String),
    /// Anything else, kept verbatim
    Text(String),
}

impl DateShape {
    /// Encode as a literal object.
    pub fn to_object(&self) -> Object {
        match self {
            Self::FullDate(v) => Object::typed(v.clone(), Datatype::Date),
            Self::Year(v) => Object::typed(v.clone(), Datatype::GYear),
            Self::Text(v) => Object::plain(v.clone()),
        }
    }
}

/// Classify a raw date; `None` for blank input.
pub fn classify_date(raw: &str) -> Option<DateShape> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if is_full_date(text) {
        return Some(DateShape::FullDate(text.to_string()));
    }
    if let Some(unsigned) = text.strip_prefix('-') {
        // BCE: bare year, or a full date reduced to its signed year
        if is_digits(unsigned, 4) || is_full_date(unsigned) {
            return Some(DateShape::Year(text[..5].to_string()));
        }
    } else if is_digits(text, 4) {
        return Some(DateShape::Year(text.to_string()));
    }

    Some(DateShape::Text(text.to_string()))
}

/// Reduce a date to its year token.
///
/// A leading `-` keeps the sign and yields five characters, otherwise four.
/// Returns `None` when the token is not a year.
pub fn extract_year(raw: &str) -> Option<String> {
    let text = raw.trim();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let year = rest.get(..4)?;
    if !is_digits(year, 4) {
        return None;
    }
    Some(format!("{sign}{year}"))
}

/// First non-empty candidate reduced to a year.
pub fn first_year<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .map(str::trim)
        .find(|c| !c.is_empty())
        .and_then(extract_year)
}

/// Cut a timestamp down to its date part and classify it.
///
/// `"1950-03-01T00:00:00Z"` becomes a full date, `"1950"` a year.
pub fn date_only(raw: &str) -> Option<DateShape> {
    let text = raw.trim();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (1, rest),
        None => (0, text),
    };
    let cut = match rest.get(..10) {
        Some(head) if is_full_date(head) => &text[..sign + 10],
        _ => text,
    };
    classify_date(cut)
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_full_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && is_digits(&s[..4], 4)
        && is_digits(&s[5..7], 2)
        && is_digits(&s[8..], 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_shapes() {
        assert_eq!(
            classify_date("1990-05-20"),
            Some(DateShape::FullDate("1990-05-20".into()))
        );
        assert_eq!(classify_date(" 1890 "), Some(DateShape::Year("1890".into())));
        assert_eq!(classify_date("-0500"), Some(DateShape::Year("-0500".into())));
        assert_eq!(
            classify_date("-0500-01-01"),
            Some(DateShape::Year("-0500".into()))
        );
        assert_eq!(
            classify_date("sec. XIX"),
            Some(DateShape::Text("sec. XIX".into()))
        );
        assert_eq!(classify_date("   "), None);
    }

    #[test]
    fn test_malformed_date_falls_back_to_text() {
        assert_eq!(
            classify_date("1990-5-20"),
            Some(DateShape::Text("1990-5-20".into()))
        );
        assert_eq!(classify_date("19900"), Some(DateShape::Text("19900".into())));
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("-0500-01-01").as_deref(), Some("-0500"));
        assert_eq!(extract_year("1990-05-20").as_deref(), Some("1990"));
        assert_eq!(extract_year("1503-01-01T00:00:00Z").as_deref(), Some("1503"));
        assert_eq!(extract_year("c. 1900"), None);
        assert_eq!(extract_year("19"), None);
    }

    #[test]
    fn test_first_year_takes_first_non_empty() {
        assert_eq!(
            first_year(["", "  ", "1889-01-01", "1900"]).as_deref(),
            Some("1889")
        );
        assert_eq!(first_year(["", ""]), None);
    }

    #[test]
    fn test_date_only_cuts_timestamps() {
        assert_eq!(
            date_only("1950-03-01T00:00:00Z"),
            Some(DateShape::FullDate("1950-03-01".into()))
        );
        assert_eq!(date_only("1950"), Some(DateShape::Year("1950".into())));
        assert_eq!(
            date_only("-0500-01-01T00:00:00Z"),
            Some(DateShape::Year("-0500".into()))
        );
    }

    #[test]
    fn test_shape_objects() {
        assert_eq!(
            DateShape::Year("-0500".into()).to_object(),
            Object::typed("-0500", Datatype::GYear)
        );
        assert_eq!(DateShape::Text("x".into()).to_object(), Object::plain("x"));
    }
}
