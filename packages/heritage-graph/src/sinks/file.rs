//! Turtle file sink.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{SinkError, SinkResult};
use crate::graph::{turtle, Description};
use crate::traits::sink::GraphSink;

/// Appends each batch to a Turtle file.
///
/// `begin` truncates the file and writes the prefix header. Every `append`
/// reopens in append mode, writes the batch and syncs it to disk, so the file
/// on disk always ends at a batch boundary.
///
/// # Example
///
/// ```rust,ignore
/// use heritage_graph::sinks::TurtleFileSink;
///
/// let sink = TurtleFileSink::new("output.ttl");
/// let pipeline = Pipeline::new(config, transport, sink)?;
/// ```
pub struct TurtleFileSink {
    path: PathBuf,
}

impl TurtleFileSink {
    /// Create a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Output file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    async fn write(&self, text: &str, truncate: bool) -> SinkResult<()> {
        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.sync_data().await.map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

#[async_trait]
impl GraphSink for TurtleFileSink {
    async fn begin(&self, schema_uri: &str) -> SinkResult<()> {
        debug!(path = %self.path.display(), "Truncating output and writing prefixes");
        self.write(&turtle::prefix_header(schema_uri), true).await
    }

    async fn append(&self, batch: &[Description]) -> SinkResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut text = turtle::write_batch(batch);
        text.push('\n');
        self.write(&text, false).await
    }

    fn name(&self) -> &str {
        "turtle_file"
    }
}
