//! Strata Core - Hexagonal Architecture Implementation
//!
//! This crate turns one application model (modules, tables, columns,
//! screens) into a coherent full-stack project tree: a Prisma schema, an
//! Express CRUD service and React pages, plus the manifests to run them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           strata-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │     (Materializer, ProjectReader)       │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │             (Filesystem)                │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    strata-adapters (Infrastructure)     │
//! │  (LocalFilesystem, MemoryFilesystem)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (ProjectContext, ProjectPlan, Emitters)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use strata_core::prelude::*;
//! # fn run(filesystem: Box<dyn Filesystem>) -> StrataResult<()> {
//! let context = ProjectContext::builder()
//!     .id("billing")
//!     .module(
//!         ModuleDefinition::new("Billing").table(
//!             TableDefinition::new("invoice")
//!                 .column(ColumnDefinition::new("id", "uuid").primary())
//!                 .column(ColumnDefinition::new("amount", "decimal")),
//!         ),
//!     )
//!     .build()?;
//!
//! let materializer = Materializer::new(filesystem, MaterializeSettings::new("generated"));
//! let project = materializer.materialize(&context)?;
//! println!("{} files in {}", project.files.len(), project.project_dir.display());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        MaterializeSettings, Materializer, ProjectReader, WriteMode, ports::Filesystem,
    };
    pub use crate::domain::{
        ArtifactClass, ColumnDefinition, DatabaseEngine, Diagnostic, GeneratedFile, Identifier,
        MaterializedProject, ModuleDefinition, ProjectContext, ScreenDefinition, ScreenKind,
        Severity, TableDefinition, TypeMapper,
    };
    pub use crate::error::{StrataError, StrataResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
