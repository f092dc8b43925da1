//! In-memory sink for testing and development.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::SinkResult;
use crate::graph::{turtle, Description};
use crate::traits::sink::GraphSink;

/// Records every flushed batch.
///
/// Cloning shares the underlying buffer, so a test can hand one clone to the
/// pipeline and inspect the other.
#[derive(Clone, Default)]
pub struct MemorySink {
    batches: Arc<RwLock<Vec<Vec<Description>>>>,
    runs_started: Arc<RwLock<usize>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All batches flushed since the last `begin`.
    pub fn batches(&self) -> Vec<Vec<Description>> {
        self.batches
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of flush operations since the last `begin`.
    pub fn flush_count(&self) -> usize {
        self.batches.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Every flushed description, in flush order.
    pub fn descriptions(&self) -> Vec<Description> {
        self.batches().into_iter().flatten().collect()
    }

    /// Number of times `begin` was called.
    pub fn runs_started(&self) -> usize {
        *self.runs_started.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Serialize everything flushed so far as Turtle, without a prefix header.
    pub fn to_turtle(&self) -> String {
        turtle::write_batch(&self.descriptions())
    }
}

#[async_trait]
impl GraphSink for MemorySink {
    async fn begin(&self, _schema_uri: &str) -> SinkResult<()> {
        self.batches
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        *self.runs_started.write().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    async fn append(&self, batch: &[Description]) -> SinkResult<()> {
        self.batches
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(batch.to_vec());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::vocab;

    #[tokio::test]
    async fn test_begin_clears_previous_run() {
        let sink = MemorySink::new();
        let d = Description::typed("http://x/artwork/1", vocab::ARTWORK);

        sink.begin("http://x#").await.unwrap();
        sink.append(&[d.clone()]).await.unwrap();
        sink.append(&[d]).await.unwrap();
        assert_eq!(sink.flush_count(), 2);

        sink.begin("http://x#").await.unwrap();
        assert_eq!(sink.flush_count(), 0);
        assert_eq!(sink.runs_started(), 2);
    }

    #[tokio::test]
    async fn test_clone_shares_buffer() {
        let sink = MemorySink::new();
        let observer = sink.clone();

        sink.append(&[Description::typed("http://x/a", vocab::ARTIST)])
            .await
            .unwrap();

        assert_eq!(observer.descriptions().len(), 1);
    }
}
