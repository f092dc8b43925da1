//! Data types shared across the pipeline.

pub mod agent;
pub mod config;
pub mod record;
pub mod term;
