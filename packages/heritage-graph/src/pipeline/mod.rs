//! Record-to-graph pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Identity minting with run-scoped dedup ([`identity`])
//! - Subgraph assembly of artworks, activities and agents ([`assemble`])
//! - Agent reconciliation and image resolution
//! - Checkpointed batch output ([`batch`])

pub mod assemble;
pub mod batch;
pub mod identity;
pub mod run;

pub use assemble::{describe_agent, Assembled, GraphAssembler};
pub use batch::BatchWriter;
pub use identity::{mint_token, IdentityMinter, RunContext};
pub use run::{Pipeline, RunSummary};
