pub mod common;
pub mod generated_file;
pub mod model;

pub use crate::domain::DomainError;
pub use common::RelativePath;
pub use generated_file::{
    ArtifactClass, Diagnostic, GeneratedFile, MaterializedProject, RunCommands, Severity,
};
pub use model::{
    ApiDescriptor, ColumnDefinition, ModuleDefinition, ProjectContext, ProjectContextBuilder,
    ScreenDefinition, TableDefinition, normalize_route,
};
