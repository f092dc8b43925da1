//! HTTP transport trait and the three-way lookup outcome.
//!
//! Every external authority (knowledge base, thesaurus, encyclopedia, image
//! search, media repository) is reached through [`HttpTransport`]. The
//! enrichment stages never surface transport failures as errors; they fold
//! them into [`Lookup::TransportError`] so a run keeps going while the failure
//! stays observable.

use async_trait::async_trait;
use url::Url;

use crate::error::{TransportError, TransportResult};

/// An outbound GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Fully encoded URL, query string included
    pub url: String,

    /// Extra request headers (name, value)
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request for an already-encoded URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Create a request from a base URL and query parameters.
    ///
    /// Parameters are percent-encoded, so labels may contain any characters.
    pub fn with_params<'a>(
        base: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> TransportResult<Self> {
        let url = Url::parse_with_params(base, params).map_err(|_| TransportError::InvalidUrl {
            url: base.to_string(),
        })?;
        Ok(Self::get(url.to_string()))
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Transport used by every external lookup.
///
/// Implementations enforce their own timeout; a timed-out call returns
/// [`TransportError::Timeout`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a GET and return the response body as text.
    async fn get_text(&self, request: &HttpRequest) -> TransportResult<String>;

    /// Perform a GET and decode the body as JSON.
    async fn get_json(&self, request: &HttpRequest) -> TransportResult<serde_json::Value> {
        let body = self.get_text(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Transport name for logging.
    fn name(&self) -> &str;
}

/// Outcome of one waterfall stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The authority returned a usable match
    Found(T),

    /// The authority answered but had nothing for this label
    NotFound,

    /// The call failed; treated like `NotFound` for control flow
    TransportError(String),
}

impl<T> Lookup<T> {
    /// Fold a transport result whose success may still be empty.
    pub fn from_result(result: TransportResult<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::NotFound,
            Err(e) => Self::TransportError(e.to_string()),
        }
    }

    /// Collapse to an option, discarding the miss/failure distinction.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::TransportError(_) => None,
        }
    }

    /// Check whether the stage produced a value.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Short outcome label for structured logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NotFound => "not_found",
            Self::TransportError(_) => "transport_error",
        }
    }

    /// Map the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
            Self::TransportError(detail) => Lookup::TransportError(detail),
        }
    }
}

/// Misses and failures seen across the stages of one waterfall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageOutcomes {
    pub not_found: usize,
    pub failed: usize,
}

impl StageOutcomes {
    /// Count a stage that did not produce a value.
    pub fn record<T>(&mut self, lookup: &Lookup<T>) {
        match lookup {
            Lookup::Found(_) => {}
            Lookup::NotFound => self.not_found += 1,
            Lookup::TransportError(_) => self.failed += 1,
        }
    }

    /// Add another tally into this one.
    pub fn absorb(&mut self, other: StageOutcomes) {
        self.not_found += other.not_found;
        self.failed += other.failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_params_encodes_label() {
        let req = HttpRequest::with_params(
            "https://query.example.org/sparql",
            [("query", "SELECT \"Muzeul Național\""), ("format", "json")],
        )
        .unwrap();

        assert!(req.url.starts_with("https://query.example.org/sparql?query="));
        assert!(!req.url.contains(' '));
        assert!(req.url.ends_with("&format=json"));
    }

    #[test]
    fn test_with_params_rejects_bad_base() {
        let err = HttpRequest::with_params("not a url", [("q", "x")]).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn test_lookup_from_result() {
        let found: Lookup<u8> = Lookup::from_result(Ok(Some(3)));
        let missing: Lookup<u8> = Lookup::from_result(Ok(None));
        let failed: Lookup<u8> = Lookup::from_result(Err(TransportError::Timeout {
            url: "https://x".into(),
        }));

        assert_eq!(found, Lookup::Found(3));
        assert_eq!(missing, Lookup::NotFound);
        assert!(matches!(failed, Lookup::TransportError(ref d) if d.contains("timeout")));
        assert_eq!(failed.outcome(), "transport_error");

        let mut tally = StageOutcomes::default();
        tally.record(&found);
        tally.record(&missing);
        tally.record(&failed);
        assert_eq!(tally, StageOutcomes { not_found: 1, failed: 1 });
        assert_eq!(failed.found(), None);
    }
}
