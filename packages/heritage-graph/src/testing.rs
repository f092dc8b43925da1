//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the graph library
//! without making real network calls.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::{Arc, RwLock};

use crate::error::{TransportError, TransportResult};
use crate::traits::transport::{HttpRequest, HttpTransport};

#[derive(Debug, Clone)]
enum MockReply {
    Body(String),
    Timeout,
}

/// A mock HTTP transport for testing.
///
/// Replies are keyed by a substring of the request URL and tried in the
/// order they were added. Unmatched requests get a 404 status error.
/// Clones share replies and call tracking.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Reply per URL substring, first match wins
    replies: Arc<RwLock<Vec<(String, MockReply)>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Create a mock that answers nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL contains `pattern` with `body`.
    pub fn with_response(self, pattern: impl Into<String>, body: impl Into<String>) -> Self {
        self.push(pattern.into(), MockReply::Body(body.into()));
        self
    }

    /// Fail requests whose URL contains `pattern` with a timeout.
    pub fn with_failure(self, pattern: impl Into<String>) -> Self {
        self.push(pattern.into(), MockReply::Timeout);
        self
    }

    fn push(&self, pattern: String, reply: MockReply) {
        self.replies
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((pattern, reply));
    }

    /// Get all requests made to this transport.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of requests whose URL contains `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.url.contains(pattern))
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get_text(&self, request: &HttpRequest) -> TransportResult<String> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let reply = self
            .replies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Timeout) => Err(TransportError::Timeout {
                url: request.url.clone(),
            }),
            None => Err(TransportError::Status {
                status: 404,
                url: request.url.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Render rows as a SPARQL JSON results document.
///
/// Values starting with `http://` or `https://` are typed as URIs, the rest
/// as plain literals.
pub fn sparql_results(rows: &[&[(&str, &str)]]) -> String {
    let bindings: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut binding = Map::new();
            for (var, value) in row.iter() {
                let kind = if value.starts_with("http://") || value.starts_with("https://") {
                    "uri"
                } else {
                    "literal"
                };
                binding.insert(var.to_string(), json!({ "type": kind, "value": value }));
            }
            Value::Object(binding)
        })
        .collect();

    let vars: Vec<&str> = rows
        .first()
        .map(|row| row.iter().map(|(var, _)| *var).collect())
        .unwrap_or_default();

    json!({
        "head": { "vars": vars },
        "results": { "bindings": bindings }
    })
    .to_string()
}

/// A minimal museum export record.
pub fn lido_record(id: &str, title: &str, actor: &str, museum: &str) -> String {
    format!(
        r#"  <lido:lido>
    <lido:lidoRecID lido:type="local">{id}</lido:lidoRecID>
    <lido:descriptiveMetadata>
      <lido:objectIdentificationWrap>
        <lido:titleWrap>
          <lido:titleSet><lido:appellationValue>{title}</lido:appellationValue></lido:titleSet>
        </lido:titleWrap>
        <lido:repositoryWrap>
          <lido:repositorySet>
            <lido:repositoryName>
              <lido:legalBodyName><lido:appellationValue>{museum}</lido:appellationValue></lido:legalBodyName>
            </lido:repositoryName>
          </lido:repositorySet>
        </lido:repositoryWrap>
      </lido:objectIdentificationWrap>
      <lido:eventWrap>
        <lido:eventSet>
          <lido:event>
            <lido:eventActor>
              <lido:actorInRole><lido:actor><lido:nameActorSet>
                <lido:appellationValue>{actor}</lido:appellationValue>
              </lido:nameActorSet></lido:actor></lido:actorInRole>
            </lido:eventActor>
            <lido:eventDate><lido:displayDate>1890</lido:displayDate></lido:eventDate>
          </lido:event>
        </lido:eventSet>
      </lido:eventWrap>
    </lido:descriptiveMetadata>
  </lido:lido>
"#
    )
}

/// Wrap records into one export document.
pub fn lido_export(records: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<lido:lidoWrap xmlns:lido=\"http://www.lido-schema.org\">\n{}</lido:lidoWrap>\n",
        records.concat()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_matches_in_order() {
        let transport = MockTransport::new()
            .with_failure("slow.example")
            .with_response("example", "hello");

        let ok = transport
            .get_text(&HttpRequest::get("https://fast.example/a"))
            .await
            .unwrap();
        assert_eq!(ok, "hello");

        let timeout = transport
            .get_text(&HttpRequest::get("https://slow.example/a"))
            .await
            .unwrap_err();
        assert!(matches!(timeout, TransportError::Timeout { .. }));

        let missing = transport
            .get_text(&HttpRequest::get("https://other.org/"))
            .await
            .unwrap_err();
        assert!(matches!(missing, TransportError::Status { status: 404, .. }));

        assert_eq!(transport.calls().len(), 3);
        assert_eq!(transport.calls_matching("example"), 2);

        transport.clear_calls();
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_sparql_results_types_values() {
        let body = sparql_results(&[&[("item", "http://x/1"), ("label", "One")]]);
        let json: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(json["results"]["bindings"][0]["item"]["type"], "uri");
        assert_eq!(json["results"]["bindings"][0]["label"]["type"], "literal");
        assert_eq!(json["head"]["vars"][1], "label");
    }

    #[test]
    fn test_lido_fixture_extracts() {
        let xml = lido_export(&[lido_record("A-1", "Boi", "Grigorescu, Nicolae", "Muzeul X")]);
        let records = crate::extract::lido::extract_all(&xml);

        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.id, "A-1");
        assert_eq!(record.actors, vec!["Grigorescu, Nicolae".to_string()]);
        assert_eq!(record.museum, "Muzeul X");
    }
}
