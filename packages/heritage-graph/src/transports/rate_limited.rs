//! Rate-limited transport wrapper.
//!
//! Wraps any HttpTransport implementation with rate limiting using the
//! governor crate, so a run stays polite towards shared public endpoints.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::TransportResult;
use crate::traits::transport::{HttpRequest, HttpTransport};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Zero rates fall back to one request per second.
fn at_least_one(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(nonzero!(1u32))
}

/// A transport wrapper that enforces rate limits.
///
/// Clones share one limiter, so every stage holding a clone draws from the
/// same budget.
pub struct RateLimitedTransport<T: HttpTransport> {
    inner: T,
    limiter: Arc<DefaultRateLimiter>,
}

impl<T: HttpTransport> RateLimitedTransport<T> {
    /// Create a new rate-limited transport.
    ///
    /// # Arguments
    /// * `transport` - The underlying transport to wrap
    /// * `requests_per_second` - Maximum requests per second
    pub fn new(transport: T, requests_per_second: u32) -> Self {
        Self::with_quota(transport, Quota::per_second(at_least_one(requests_per_second)))
    }

    /// Create with a custom quota.
    pub fn with_quota(transport: T, quota: Quota) -> Self {
        Self {
            inner: transport,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create with burst support.
    pub fn with_burst(transport: T, requests_per_second: u32, burst: u32) -> Self {
        let quota =
            Quota::per_second(at_least_one(requests_per_second)).allow_burst(at_least_one(burst));
        Self::with_quota(transport, quota)
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for RateLimitedTransport<T> {
    async fn get_text(&self, request: &HttpRequest) -> TransportResult<String> {
        self.limiter.until_ready().await;
        self.inner.get_text(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Builder for RateLimitedTransport.
pub struct RateLimitedTransportBuilder<T: HttpTransport> {
    transport: T,
    requests_per_second: u32,
    burst: Option<u32>,
}

impl<T: HttpTransport> RateLimitedTransportBuilder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            requests_per_second: 1,
            burst: None,
        }
    }

    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps;
        self
    }

    pub fn burst(mut self, burst: u32) -> Self {
        self.burst = Some(burst);
        self
    }

    pub fn build(self) -> RateLimitedTransport<T> {
        match self.burst {
            Some(burst) => {
                RateLimitedTransport::with_burst(self.transport, self.requests_per_second, burst)
            }
            None => RateLimitedTransport::new(self.transport, self.requests_per_second),
        }
    }
}

/// Extension trait for easy rate limiting.
pub trait TransportExt: HttpTransport + Sized {
    /// Wrap this transport with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedTransport<Self> {
        RateLimitedTransport::new(self, requests_per_second)
    }

    /// Wrap with rate limiting and burst support.
    fn rate_limited_with_burst(
        self,
        requests_per_second: u32,
        burst: u32,
    ) -> RateLimitedTransport<Self> {
        RateLimitedTransport::with_burst(self, requests_per_second, burst)
    }
}

impl<T: HttpTransport + Sized> TransportExt for T {}
