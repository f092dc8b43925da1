//! Transport implementations.

pub mod http;
pub mod rate_limited;
pub mod sparql;

pub use http::ReqwestTransport;
pub use rate_limited::{RateLimitedTransport, RateLimitedTransportBuilder, TransportExt};
