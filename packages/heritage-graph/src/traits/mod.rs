//! Trait seams between the pipeline and the outside world.
//!
//! - `HttpTransport`: every outbound lookup (reconciliation, images, source queries)
//! - `GraphSink`: where flushed batches go

pub mod sink;
pub mod transport;

pub use sink::GraphSink;
pub use transport::{HttpRequest, HttpTransport, Lookup, StageOutcomes};
