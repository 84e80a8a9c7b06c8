//! Persistence layer: one Prisma schema for every table of every module.

use super::{
    Emitter,
    plan::{AUDIT, ColumnPlan, ModulePlan, ProjectPlan, TablePlan},
    source::{SourceBuilder, one_line},
};
use crate::domain::{entities::GeneratedFile, value_objects::DatabaseEngine};

pub const SCHEMA_PATH: &str = "backend/prisma/schema.prisma";
pub const CLIENT_PATH: &str = "backend/src/db/client.ts";

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaEmitter;

impl Emitter for SchemaEmitter {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn emit(&self, plan: &ProjectPlan) -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new(SCHEMA_PATH, render_schema(plan)),
            GeneratedFile::new(CLIENT_PATH, CLIENT_TS),
        ]
    }
}

pub fn render_schema(plan: &ProjectPlan) -> String {
    let mut out = SourceBuilder::new();
    out.line(format!(
        "// Prisma schema for {}. Generated by strata; regenerate instead of editing.",
        one_line(&plan.project_name)
    ));
    out.blank();
    out.open("generator client {")
        .line("provider = \"prisma-client-js\"")
        .close("}");
    out.blank();
    out.open("datasource db {")
        .line(format!("provider = \"{}\"", plan.database.provider()))
        .line("url      = env(\"DATABASE_URL\")")
        .close("}");

    for (module, table) in plan.tables() {
        out.blank();
        render_model(&mut out, module, table, &plan.database);
    }

    out.finish()
}

/// One field line, split so the block can be column-aligned.
struct FieldLine {
    doc: Option<String>,
    name: String,
    ty: String,
    attributes: Vec<String>,
}

fn render_model(
    out: &mut SourceBuilder,
    module: &ModulePlan,
    table: &TablePlan,
    engine: &DatabaseEngine,
) {
    let mut fields: Vec<FieldLine> = table
        .columns
        .iter()
        .map(|column| column_line(table, column, engine))
        .collect();

    fields.extend(AUDIT.iter().map(|audit| FieldLine {
        doc: None,
        name: audit.field.to_string(),
        ty: "DateTime".to_string(),
        attributes: vec![
            audit.attributes.to_string(),
            format!("@map(\"{}\")", audit.storage),
        ],
    }));

    let name_width = fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let type_width = fields.iter().map(|f| f.ty.len()).max().unwrap_or(0);

    out.line(format!("/// Module: {}", one_line(&module.name)));
    out.open(format!("model {} {{", table.model()));
    for field in &fields {
        if let Some(doc) = &field.doc {
            out.line(format!("/// {doc}"));
        }
        let line = if field.attributes.is_empty() {
            format!("{:<name_width$} {}", field.name, field.ty)
        } else {
            format!(
                "{:<name_width$} {:<type_width$} {}",
                field.name,
                field.ty,
                field.attributes.join(" ")
            )
        };
        out.line(line);
    }
    out.blank();
    out.line(format!("@@map(\"{}\")", table.ident.snake()));
    out.close("}");
}

fn column_line(table: &TablePlan, column: &ColumnPlan, engine: &DatabaseEngine) -> FieldLine {
    let storage = column.mapping().storage;
    let mut attributes = Vec::new();

    if column.is_key {
        attributes.push("@id".to_string());
        if let Some(default) = table.key_default {
            attributes.push(default.attribute().to_string());
        }
    } else if column.unique {
        attributes.push("@unique".to_string());
    }

    if let Some(hint) = storage.native.and_then(|h| h.render(engine)) {
        attributes.push(hint.to_string());
    }

    let field = column.field();
    let storage_name = column.storage();
    if field != storage_name {
        attributes.push(format!("@map(\"{storage_name}\")"));
    }

    let optional = if column.nullable { "?" } else { "" };

    FieldLine {
        doc: column
            .references
            .as_deref()
            .map(|target| format!("references {}", one_line(target))),
        name: field,
        ty: format!("{}{optional}", storage.scalar.as_str()),
        attributes,
    }
}

const CLIENT_TS: &str = r#"import { PrismaClient } from '@prisma/client';

const globalForPrisma = globalThis as unknown as { prisma?: PrismaClient };

export const prisma = globalForPrisma.prisma ?? new PrismaClient();

if (process.env.NODE_ENV !== 'production') {
  globalForPrisma.prisma = prisma;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ArtifactClass, ColumnDefinition, ModuleDefinition, ProjectContext, TableDefinition,
    };

    fn schema(ctx: ProjectContext) -> String {
        render_schema(&ProjectPlan::build(&ctx))
    }

    fn model_block<'a>(schema: &'a str, model: &str) -> &'a str {
        let start = schema.find(&format!("model {model} {{")).unwrap();
        let end = schema[start..].find("\n}").unwrap();
        &schema[start..start + end]
    }

    fn field_names(block: &str) -> Vec<&str> {
        block
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("///") && !l.starts_with("@@"))
            .filter_map(|l| l.split_whitespace().next())
            .collect()
    }

    fn billing() -> ProjectContext {
        ProjectContext::builder()
            .id("billing")
            .module(
                ModuleDefinition::new("Billing").table(
                    TableDefinition::new("invoice")
                        .column(ColumnDefinition::new("id", "uuid").primary())
                        .column(ColumnDefinition::new("amount", "decimal").not_null())
                        .column(ColumnDefinition::new("status", "text")),
                ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn declared_columns_then_audit() {
        let out = schema(billing());
        let block = model_block(&out, "Invoice");
        assert_eq!(
            field_names(block),
            ["id", "amount", "status", "createdAt", "updatedAt"]
        );
        assert!(block.contains("@@map(\"invoice\")"));
    }

    #[test]
    fn renders_types_nullability_and_defaults() {
        let out = schema(billing());
        assert!(out.contains("provider = \"postgresql\""));
        assert!(out.contains("id        String   @id @default(uuid()) @db.Uuid"));
        assert!(out.contains("amount    Decimal  @db.Decimal(12, 2)"));
        assert!(out.contains("status    String?  @db.Text"));
        assert!(out.contains("createdAt DateTime @default(now()) @map(\"created_at\")"));
        assert!(out.contains("updatedAt DateTime @updatedAt @map(\"updated_at\")"));
    }

    #[test]
    fn maps_multi_word_names() {
        let ctx = ProjectContext::builder()
            .id("shop")
            .database("sqlite")
            .module(
                ModuleDefinition::new("Sales").table(
                    TableDefinition::new("line item")
                        .column(ColumnDefinition::new("Unit Price", "float"))
                        .column(ColumnDefinition::new("sku", "string").unique())
                        .column(ColumnDefinition::new("order_ref", "int").references("order")),
                ),
            )
            .build()
            .unwrap();
        let out = schema(ctx);
        let block = model_block(&out, "LineItem");

        assert_eq!(
            field_names(block),
            ["id", "unitPrice", "sku", "orderRef", "createdAt", "updatedAt"]
        );
        assert!(block.contains("@map(\"unit_price\")"));
        assert!(block.contains("@unique"));
        assert!(block.contains("/// references order"));
        assert!(block.contains("@@map(\"line_item\")"));
        // sqlite has no native hints
        assert!(!block.contains("@db."));
        assert!(out.contains("provider = \"sqlite\""));
    }

    #[test]
    fn flattens_modules_into_one_schema() {
        let ctx = ProjectContext::builder()
            .id("two")
            .module(ModuleDefinition::new("A").table(TableDefinition::new("alpha")))
            .module(ModuleDefinition::new("B").table(TableDefinition::new("beta")))
            .build()
            .unwrap();
        let files = SchemaEmitter.emit(&ProjectPlan::build(&ctx));
        assert_eq!(files.len(), 2);
        assert!(files[0].content.contains("model Alpha {"));
        assert!(files[0].content.contains("model Beta {"));
        assert_eq!(files[0].class, ArtifactClass::Persistence);
        assert_eq!(files[1].class, ArtifactClass::Persistence);
    }

    #[test]
    fn integer_keys_autoincrement() {
        let ctx = ProjectContext::builder()
            .id("n")
            .module(
                ModuleDefinition::new("M").table(
                    TableDefinition::new("counter")
                        .column(ColumnDefinition::new("id", "bigserial").primary()),
                ),
            )
            .build()
            .unwrap();
        let out = schema(ctx);
        assert!(out.contains("id        BigInt   @id @default(autoincrement())"));
    }
}
