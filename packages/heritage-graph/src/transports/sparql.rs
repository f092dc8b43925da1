//! SPARQL SELECT over an [`HttpTransport`].
//!
//! Queries go out as `GET <endpoint>?query=...&format=json` and the standard
//! JSON results format comes back. Callers consume "first row, named fields",
//! so rows are exposed as simple variable lookups.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::TransportResult;
use crate::traits::transport::{HttpRequest, HttpTransport};

const ACCEPT: &str = "application/sparql-results+json";

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, BindingValue>>,
}

/// One bound value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: HashMap<String, BindingValue>,
}

impl Row {
    /// Trimmed value of a variable; `None` when unbound or blank.
    pub fn get(&self, var: &str) -> Option<&str> {
        self.values
            .get(var)
            .map(|v| v.value.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value of a variable, or empty.
    pub fn text(&self, var: &str) -> &str {
        self.get(var).unwrap_or("")
    }

    /// Value of a variable only if it is bound to a URI.
    pub fn uri(&self, var: &str) -> Option<&str> {
        self.values
            .get(var)
            .filter(|v| v.kind == "uri")
            .map(|v| v.value.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, var: &str) -> bool {
        self.get(var).is_some()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    /// Build a row of literal values, mostly for tests.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(k, v)| {
                let value: String = v.into();
                let kind = if value.starts_with("http://") || value.starts_with("https://") {
                    "uri"
                } else {
                    "literal"
                };
                (
                    k.into(),
                    BindingValue {
                        kind: kind.to_string(),
                        value,
                        lang: None,
                    },
                )
            })
            .collect();
        Self { values }
    }
}

/// Build the request for a SELECT query.
pub fn select_request(endpoint: &str, query: &str) -> TransportResult<HttpRequest> {
    Ok(HttpRequest::with_params(endpoint, [("query", query), ("format", "json")])?
        .header("Accept", ACCEPT))
}

/// Run a SELECT query and return every row.
pub async fn select(
    transport: &dyn HttpTransport,
    endpoint: &str,
    query: &str,
) -> TransportResult<Vec<Row>> {
    let request = select_request(endpoint, query)?;
    let body = transport.get_text(&request).await?;
    let response: SparqlResponse = serde_json::from_str(&body)?;

    debug!(
        endpoint = %endpoint,
        rows = response.results.bindings.len(),
        "SPARQL select complete"
    );

    Ok(response
        .results
        .bindings
        .into_iter()
        .map(|values| Row { values })
        .collect())
}

/// Run a SELECT query and return the first row, if any.
pub async fn select_first(
    transport: &dyn HttpTransport,
    endpoint: &str,
    query: &str,
) -> TransportResult<Option<Row>> {
    Ok(select(transport, endpoint, query).await?.into_iter().next())
}

/// Escape a label for substitution into a double-quoted SPARQL string.
pub fn escape_label(label: &str) -> String {
    label
        .trim()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\n', '\r'], " ")
}
