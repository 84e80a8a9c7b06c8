//! Infrastructure adapters for Strata.
//!
//! This crate implements the ports defined in `strata-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod context_loader;
pub mod filesystem;

// Re-export commonly used adapters
pub use context_loader::{ContextFormat, ContextLoader};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
