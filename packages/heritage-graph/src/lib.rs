//! Heritage Record Graph Library
//!
//! Turns heritage-object records from a museum collection export and from a
//! public knowledge base into one deduplicated, provenance-annotated RDF
//! graph, serialized as Turtle.
//!
//! # Design
//!
//! - One flat record type for both sources; everything downstream is shared
//! - Identifiers are minted from normalized labels, so re-runs are stable
//! - An agent is described once per run, first writer wins
//! - External lookups are waterfalls that never abort a run
//! - Output is appended in batches, so a crash loses one batch at most
//!
//! # Usage
//!
//! ```rust,ignore
//! use heritage_graph::{Pipeline, PipelineConfig, TurtleFileSink};
//! use heritage_graph::testing::MockTransport;
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::default().offline();
//! let pipeline = Pipeline::new(config, Arc::new(MockTransport::new()), TurtleFileSink::new("out.ttl"))?;
//!
//! let summary = pipeline.run_museum_export_file("export.xml").await?;
//! println!("{} records in {} batches", summary.records_written, summary.batches_flushed);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (HttpTransport, GraphSink)
//! - [`types`] - Records, agents, terms and configuration
//! - [`extract`] - Museum export and knowledge-base record extraction
//! - [`graph`] - Graph model and Turtle serialization
//! - [`pipeline`] - Identity minting, assembly, batching and the run loop
//! - [`reconcile`] - Agent and term reconciliation against external authorities
//! - [`images`] - Image waterfall and URL normalization
//! - [`transports`] - HTTP transport implementations
//! - [`sinks`] - Output sinks (Turtle file, memory)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod extract;
pub mod graph;
pub mod images;
pub mod pipeline;
pub mod reconcile;
pub mod sinks;
pub mod testing;
pub mod traits;
pub mod transports;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractError, PipelineError, Result, SinkError, TransportError};
pub use traits::{GraphSink, HttpRequest, HttpTransport, Lookup, StageOutcomes};
pub use types::{
    agent::{Agent, AgentKind, AgentVariant, AuthorityLinks},
    config::{EndpointConfig, HttpConfig, PipelineConfig},
    record::{ArtworkRecord, MetadataStamp, RecordSource},
    term::{Term, TermKind},
};

// Re-export pipeline
pub use pipeline::{GraphAssembler, IdentityMinter, Pipeline, RunContext, RunSummary};

// Re-export lookups
pub use images::{ImageResolver, ResolvedImage};
pub use reconcile::{Reconciliation, ReconciliationClient, TermReconciliation};

// Re-export implementations
pub use sinks::{MemorySink, TurtleFileSink};
pub use transports::{RateLimitedTransport, ReqwestTransport, TransportExt};

// Re-export testing utilities
pub use testing::MockTransport;
