//! Emitters: one per layer of the generated project.
//!
//! Every emitter reads the same [`ProjectPlan`], so names, keys and types
//! agree across the schema, the routes and the pages. Emitters never fail;
//! malformed input is rejected by [`DomainValidator`] before they run.

pub mod config;
pub mod plan;
pub mod routes;
pub mod schema;
pub mod screens;
pub mod source;
pub mod template;

use crate::domain::{
    entities::{Diagnostic, GeneratedFile, ProjectContext},
    error::DomainError,
    validation::DomainValidator,
};

pub use config::ConfigEmitter;
pub use plan::{
    AUDIT, AuditColumn, CONVENTIONAL_KEY, ColumnPlan, KeyDefault, KeyOrigin, ModulePlan,
    ProjectPlan, ScreenPlan, TablePlan,
};
pub use routes::{API_PORT, Operation, RouteEmitter};
pub use schema::SchemaEmitter;
pub use screens::ScreenEmitter;
pub use template::RenderContext;

/// One layer of the generated project.
pub trait Emitter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn emit(&self, plan: &ProjectPlan) -> Vec<GeneratedFile>;
}

/// Output of one generation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generation {
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(GeneratedFile::size).sum()
    }
}

/// Service, persistence, presentation, then config.
pub fn default_emitters() -> Vec<Box<dyn Emitter>> {
    vec![
        Box::new(RouteEmitter),
        Box::new(SchemaEmitter),
        Box::new(ScreenEmitter),
        Box::new(ConfigEmitter),
    ]
}

/// Validate, plan, and run `emitters` in order.
///
/// Pure: the same context always yields the same files in the same order.
pub fn generate(
    context: &ProjectContext,
    emitters: &[Box<dyn Emitter>],
) -> Result<Generation, DomainError> {
    DomainValidator::validate_context(context)?;

    let plan = ProjectPlan::build(context);
    let files: Vec<GeneratedFile> = emitters.iter().flat_map(|e| e.emit(&plan)).collect();

    DomainValidator::validate_files(&files)?;

    Ok(Generation {
        files,
        diagnostics: plan.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ArtifactClass, ColumnDefinition, ModuleDefinition, ScreenDefinition, TableDefinition,
    };

    fn scenario_a() -> ProjectContext {
        ProjectContext::builder()
            .id("billing")
            .module(
                ModuleDefinition::new("Billing")
                    .table(
                        TableDefinition::new("invoice")
                            .column(ColumnDefinition::new("id", "uuid").primary())
                            .column(ColumnDefinition::new("amount", "decimal"))
                            .column(ColumnDefinition::new("issued", "date")),
                    )
                    .screen(ScreenDefinition::new("Invoices", "list", "/invoices")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn layers_come_out_in_order() {
        let generation = generate(&scenario_a(), &default_emitters()).unwrap();
        let first_of = |class| {
            generation
                .files
                .iter()
                .position(|f| f.class == class)
                .unwrap()
        };
        assert!(first_of(ArtifactClass::Service) < first_of(ArtifactClass::Persistence));
        assert!(first_of(ArtifactClass::Persistence) < first_of(ArtifactClass::Presentation));
        assert!(first_of(ArtifactClass::Presentation) < first_of(ArtifactClass::Config));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(&scenario_a(), &default_emitters()).unwrap();
        let b = generate(&scenario_a(), &default_emitters()).unwrap();
        assert_eq!(a, b);
        assert!(a.total_bytes() > 0);
    }

    #[test]
    fn names_agree_across_layers() {
        let generation = generate(&scenario_a(), &default_emitters()).unwrap();
        let content = |path: &str| {
            generation
                .files
                .iter()
                .find(|f| f.path.as_str() == path)
                .map(|f| f.content.clone())
                .unwrap()
        };

        assert!(content("backend/prisma/schema.prisma").contains("model Invoice {"));
        let router = content("backend/src/routes/billing.ts");
        assert!(router.contains("prisma.invoice.findMany"));
        assert!(router.contains("'/invoice'"));
        assert!(content("backend/src/index.ts").contains("'/api/billing'"));
        assert!(
            content("frontend/src/pages/BillingInvoices.tsx").contains("apiUrl('billing/invoice')")
        );
    }

    #[test]
    fn invalid_models_emit_nothing() {
        let ctx = ProjectContext::builder()
            .id("x")
            .module(
                ModuleDefinition::new("M").table(
                    TableDefinition::new("t")
                        .column(ColumnDefinition::new("title", "text"))
                        .column(ColumnDefinition::new("Title", "text")),
                ),
            )
            .build()
            .unwrap();
        assert!(matches!(
            generate(&ctx, &default_emitters()),
            Err(DomainError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn colliding_emitters_are_rejected() {
        let twice: Vec<Box<dyn Emitter>> = vec![Box::new(SchemaEmitter), Box::new(SchemaEmitter)];
        assert!(matches!(
            generate(&scenario_a(), &twice),
            Err(DomainError::DuplicatePath { .. })
        ));
    }
}
