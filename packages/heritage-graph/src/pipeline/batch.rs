//! Checkpointed batch writing.
//!
//! Subgraphs accumulate in memory and are appended to the sink every
//! `batch_size` records, then once more for the remainder at the end of the
//! run. A crash therefore loses at most the batch being buffered.

use tracing::debug;

use crate::error::SinkResult;
use crate::graph::{Description, Subgraph};
use crate::traits::sink::GraphSink;

pub struct BatchWriter<'a, S: GraphSink> {
    sink: &'a S,
    batch_size: usize,
    buffer: Vec<Description>,
    records_buffered: usize,
    flushes: usize,
}

impl<'a, S: GraphSink> BatchWriter<'a, S> {
    /// A zero batch size is treated as one.
    pub fn new(sink: &'a S, batch_size: usize) -> Self {
        Self {
            sink,
            batch_size: batch_size.max(1),
            buffer: Vec::new(),
            records_buffered: 0,
            flushes: 0,
        }
    }

    /// Buffer one record's subgraph; returns whether a flush happened.
    pub async fn push(&mut self, subgraph: Subgraph) -> SinkResult<bool> {
        self.buffer.extend(subgraph.descriptions);
        self.records_buffered += 1;

        if self.records_buffered >= self.batch_size {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Flush whatever is left. Returns the total number of flushes.
    pub async fn finish(mut self) -> SinkResult<usize> {
        if self.records_buffered > 0 {
            self.flush().await?;
        }
        Ok(self.flushes)
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Records buffered since the last flush.
    pub fn pending(&self) -> usize {
        self.records_buffered
    }

    async fn flush(&mut self) -> SinkResult<()> {
        self.sink.append(&self.buffer).await?;
        self.flushes += 1;
        debug!(
            sink = self.sink.name(),
            records = self.records_buffered,
            descriptions = self.buffer.len(),
            flush = self.flushes,
            "Batch flushed"
        );
        self.buffer.clear();
        self.records_buffered = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::vocab;
    use crate::sinks::MemorySink;
    use proptest::prelude::*;

    fn subgraph(n: usize) -> Subgraph {
        let mut graph = Subgraph::new();
        let mut d = Description::typed(format!("http://x/artwork/{n}"), vocab::ARTWORK);
        d.push_text(vocab::TITLE, &format!("Work {n}"));
        graph.push(d);
        graph
    }

    async fn write(records: usize, batch_size: usize) -> (usize, MemorySink) {
        let sink = MemorySink::new();
        let mut writer = BatchWriter::new(&sink, batch_size);
        for n in 0..records {
            writer.push(subgraph(n)).await.unwrap();
        }
        let flushes = writer.finish().await.unwrap();
        (flushes, sink)
    }

    #[tokio::test]
    async fn test_flushes_full_batches_then_remainder() {
        let (flushes, sink) = write(7, 3).await;

        assert_eq!(flushes, 3);
        let sizes: Vec<usize> = sink.batches().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_no_records_no_flush() {
        let (flushes, sink) = write(0, 3).await;
        assert_eq!(flushes, 0);
        assert_eq!(sink.flush_count(), 0);
    }

    #[tokio::test]
    async fn test_source_order_preserved() {
        let (_, sink) = write(4, 2).await;
        let subjects: Vec<String> = sink.descriptions().into_iter().map(|d| d.subject).collect();
        assert_eq!(
            subjects,
            vec![
                "http://x/artwork/0",
                "http://x/artwork/1",
                "http://x/artwork/2",
                "http://x/artwork/3"
            ]
        );
    }

    #[tokio::test]
    async fn test_push_reports_flush() {
        let sink = MemorySink::new();
        let mut writer = BatchWriter::new(&sink, 2);

        assert!(!writer.push(subgraph(0)).await.unwrap());
        assert_eq!(writer.pending(), 1);
        assert!(writer.push(subgraph(1)).await.unwrap());
        assert_eq!(writer.pending(), 0);
        assert_eq!(writer.flushes(), 1);
    }

    proptest! {
        #[test]
        fn prop_flush_count_is_ceiling(records in 1usize..60, batch_size in 1usize..20) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let (flushes, sink) = runtime.block_on(write(records, batch_size));

            prop_assert_eq!(flushes, records.div_ceil(batch_size));
            prop_assert_eq!(sink.flush_count(), flushes);
        }
    }
}
