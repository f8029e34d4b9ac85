//! Library entry for serato-tags-cli used by integration tests and embedding.

pub mod commands;
pub mod geob;

// Re-export commands for convenience
pub use commands::*;
