//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "materialize a project" or "list its files".

pub mod materializer;
pub mod project_reader;

pub use materializer::{MaterializeSettings, Materializer, WriteMode};
pub use project_reader::ProjectReader;
