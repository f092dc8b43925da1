//! Output sink trait.
//!
//! A sink receives whole batches. Once `append` returns, the batch is durable
//! as far as the sink can guarantee, so a crash loses at most the batch
//! currently buffered in the writer.

use async_trait::async_trait;

use crate::error::SinkResult;
use crate::graph::Description;

/// Destination for assembled graph batches.
#[async_trait]
pub trait GraphSink: Send + Sync {
    /// Start a run: discard prior output and write the prefix header.
    ///
    /// A re-run produces a new, separately complete output.
    async fn begin(&self, schema_uri: &str) -> SinkResult<()>;

    /// Append one batch of descriptions.
    async fn append(&self, batch: &[Description]) -> SinkResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}
