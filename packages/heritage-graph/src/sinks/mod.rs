//! Graph sink implementations.

pub mod file;
pub mod memory;

pub use file::TurtleFileSink;
pub use memory::MemorySink;
