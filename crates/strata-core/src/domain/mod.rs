// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Strata.
//!
//! Pure business logic: the project model, naming, type mapping, validation
//! and the emitters. All I/O is handled via ports defined in the application
//! layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Deterministic**: The same model always yields the same files
//! - **Immutable entities**: All domain objects are Clone + PartialEq
pub mod emit;
pub mod entities;
pub mod error;
pub mod naming;
pub mod types;
pub mod value_objects;

mod validation;

pub use emit::{Emitter, Generation, ProjectPlan, default_emitters, generate};
pub use entities::{
    ApiDescriptor, ArtifactClass, ColumnDefinition, Diagnostic, GeneratedFile,
    MaterializedProject, ModuleDefinition, ProjectContext, RelativePath, RunCommands,
    ScreenDefinition, Severity, TableDefinition,
};
pub use error::{DomainError, ErrorCategory};
pub use naming::Identifier;
pub use types::{TypeMapper, TypeMapping, TypeResolution};
pub use value_objects::{DatabaseEngine, ScreenKind};
pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_round_trips_through_json() {
        let json = r#"{
            "projectId": "crm",
            "projectName": "Little CRM",
            "database": "mysql",
            "modules": [{
                "name": "Contacts",
                "tables": [{
                    "name": "person",
                    "columns": [
                        { "name": "id", "type": "serial", "primaryKey": true },
                        { "name": "email", "type": "email", "nullable": false }
                    ]
                }],
                "screens": [{ "name": "People", "kind": "list", "route": "people/" }]
            }]
        }"#;

        let ctx: ProjectContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.database, DatabaseEngine::MySql);
        assert_eq!(ctx.modules[0].screens[0].route, "/people");
        assert_eq!(ctx.modules[0].screens[0].kind, ScreenKind::List);

        let generation = generate(&ctx, &default_emitters()).unwrap();
        let schema = generation
            .files
            .iter()
            .find(|f| f.path.as_str() == "backend/prisma/schema.prisma")
            .unwrap();
        assert!(schema.content.contains("provider = \"mysql\""));
        assert!(schema.content.contains("@default(autoincrement())"));
    }

    #[test]
    fn unknown_engine_warns_but_generates() {
        let ctx = ProjectContext::builder()
            .id("odd")
            .database("cockroach")
            .build()
            .unwrap();
        let generation = generate(&ctx, &default_emitters()).unwrap();
        assert!(
            generation
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Warning && d.subject == "database")
        );
    }

    #[test]
    fn unsafe_project_ids_are_rejected() {
        for id in ["", "..", "a/b", ".hidden"] {
            let ctx = ProjectContext {
                project_id: id.to_string(),
                project_name: String::new(),
                domain: String::new(),
                database: DatabaseEngine::default(),
                modules: Vec::new(),
            };
            let err = generate(&ctx, &default_emitters()).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Validation, "{id:?}");
        }
    }
}
