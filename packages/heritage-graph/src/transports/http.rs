//! reqwest-backed transport.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{TransportError, TransportResult};
use crate::traits::transport::{HttpRequest, HttpTransport};
use crate::types::config::HttpConfig;

/// HTTP transport over a shared `reqwest::Client`.
///
/// # Example
///
/// ```rust,ignore
/// use heritage_graph::transports::{ReqwestTransport, TransportExt};
/// use heritage_graph::types::config::HttpConfig;
///
/// let config = HttpConfig::default();
/// let transport = ReqwestTransport::new(&config)?.rate_limited(config.requests_per_second);
/// ```
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &HttpConfig) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Http(Box::new(e)))?;
        Ok(Self { client })
    }

    /// Use a custom HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_text(&self, request: &HttpRequest) -> TransportResult<String> {
        debug!(url = %request.url, "HTTP fetch starting");

        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "HTTP request failed");
            classify(e, &request.url)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %request.url, status = status.as_u16(), "HTTP error status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        let body = response.text().await.map_err(|e| classify(e, &request.url))?;
        debug!(url = %request.url, bytes = body.len(), "HTTP fetch complete");
        Ok(body)
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}

fn classify(error: reqwest::Error, url: &str) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Http(Box::new(error))
    }
}
