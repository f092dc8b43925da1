//! Typed errors for the heritage graph pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so that the pipeline can
//! tell a skippable record apart from a fatal sink failure.

use thiserror::Error;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The output sink could not be appended to
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// The input could not be read at all
    #[error("input error: {0}")]
    Input(#[source] std::io::Error),

    /// The record source itself (not an enrichment lookup) failed
    #[error("source fetch failed: {0}")]
    Source(#[from] TransportError),

    /// Invalid configuration
    #[error("config error: {reason}")]
    Config { reason: String },
}

/// A single source record could not be turned into a field set.
///
/// Never fatal: the pipeline skips the record and counts it.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// XML syntax error inside the record
    #[error("malformed XML in record #{position}: {detail}")]
    MalformedXml { position: usize, detail: String },

    /// Record has no identifier, so no artwork URI can be minted
    #[error("record #{position} has no identifier")]
    MissingIdentifier { position: usize },

    /// A knowledge-base binding row lacks a required variable
    #[error("binding row #{position} is missing `{variable}`")]
    MissingBinding { position: usize, variable: String },
}

impl ExtractError {
    /// Position of the offending record in the source stream (0-based).
    pub fn position(&self) -> usize {
        match self {
            Self::MalformedXml { position, .. }
            | Self::MissingIdentifier { position }
            | Self::MissingBinding { position, .. } => *position,
        }
    }
}

/// Errors from a single outbound HTTP lookup.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request failed to complete (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Request exceeded its timeout
    #[error("timeout requesting: {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Response body could not be decoded
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Errors writing assembled graph batches.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Underlying I/O failed
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Result type alias for sink operations.
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Result type alias for record extraction.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
