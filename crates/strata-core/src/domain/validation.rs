use std::collections::HashSet;

use crate::domain::{
    entities::{GeneratedFile, ProjectContext, TableDefinition},
    emit::AUDIT,
    error::DomainError,
    naming::Identifier,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// Reject models that would produce inconsistent output.
    pub fn validate_context(context: &ProjectContext) -> Result<(), DomainError> {
        Self::validate_project_id(&context.project_id)?;

        let mut modules = HashSet::new();
        let mut tables = HashSet::new();

        for module in &context.modules {
            let key = Identifier::parse(&module.name).kebab();
            if !modules.insert(key.clone()) {
                return Err(DomainError::DuplicateModule {
                    module: module.name.clone(),
                    key,
                });
            }

            for table in &module.tables {
                let key = Identifier::parse(&table.name).upper_camel();
                if !tables.insert(key.clone()) {
                    return Err(DomainError::DuplicateTable {
                        module: module.name.clone(),
                        table: table.name.clone(),
                        key,
                    });
                }
                Self::validate_table(table)?;
            }
        }

        Ok(())
    }

    /// Column names unique, at most one primary, no audit collisions.
    pub fn validate_table(table: &TableDefinition) -> Result<(), DomainError> {
        let mut seen = HashSet::new();

        for column in &table.columns {
            let field = Identifier::parse(&column.name).lower_camel();

            if let Some(reserved) = AUDIT.iter().map(|a| a.field).find(|a| *a == field) {
                return Err(DomainError::ReservedColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    reserved,
                });
            }

            if !seen.insert(field) {
                return Err(DomainError::DuplicateColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        let primaries: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.clone())
            .collect();

        if primaries.len() > 1 {
            return Err(DomainError::MultiplePrimaryKeys {
                table: table.name.clone(),
                columns: primaries,
            });
        }

        Ok(())
    }

    /// The id becomes one directory name under the output root.
    pub fn validate_project_id(id: &str) -> Result<(), DomainError> {
        let reason = if id.trim().is_empty() {
            Some("must not be empty")
        } else if id.contains('/') || id.contains('\\') {
            Some("must not contain path separators")
        } else if id == "." || id == ".." {
            Some("must not be a relative path component")
        } else if id.starts_with('.') {
            Some("must not start with '.'")
        } else if id.chars().any(|c| c.is_control() || c == ':') {
            Some("must not contain control characters or ':'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidProjectId {
                id: id.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// No two artifacts share a path.
    pub fn validate_files(files: &[GeneratedFile]) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for file in files {
            if file.path.as_path().is_absolute() || file.path.as_str().starts_with('/') {
                return Err(DomainError::AbsolutePathNotAllowed {
                    path: file.path.to_string(),
                });
            }
            if !seen.insert(file.path.as_str()) {
                return Err(DomainError::DuplicatePath {
                    path: file.path.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ColumnDefinition, ModuleDefinition};

    fn context(modules: Vec<ModuleDefinition>) -> ProjectContext {
        let mut builder = ProjectContext::builder().id("demo");
        for module in modules {
            builder = builder.module(module);
        }
        builder.build().unwrap()
    }

    #[test]
    fn accepts_well_formed_model() {
        let ctx = context(vec![
            ModuleDefinition::new("Billing").table(
                TableDefinition::new("invoice")
                    .column(ColumnDefinition::new("id", "uuid").primary())
                    .column(ColumnDefinition::new("amount", "decimal")),
            ),
            ModuleDefinition::new("Customers").table(TableDefinition::new("customer")),
        ]);
        assert!(DomainValidator::validate_context(&ctx).is_ok());
    }

    #[test]
    fn rejects_bad_project_ids() {
        for id in ["", "  ", "a/b", "a\\b", ".", "..", ".hidden", "c:drive"] {
            assert!(
                matches!(
                    DomainValidator::validate_project_id(id),
                    Err(DomainError::InvalidProjectId { .. })
                ),
                "{id:?}"
            );
        }
        assert!(DomainValidator::validate_project_id("billing-portal_2").is_ok());
    }

    #[test]
    fn rejects_duplicate_modules_after_normalization() {
        let ctx = context(vec![
            ModuleDefinition::new("Order Items"),
            ModuleDefinition::new("order-items"),
        ]);
        assert_eq!(
            DomainValidator::validate_context(&ctx),
            Err(DomainError::DuplicateModule {
                module: "order-items".into(),
                key: "order-items".into()
            })
        );
    }

    #[test]
    fn rejects_tables_colliding_across_modules() {
        let ctx = context(vec![
            ModuleDefinition::new("Sales").table(TableDefinition::new("line_item")),
            ModuleDefinition::new("Stock").table(TableDefinition::new("LineItem")),
        ]);
        assert!(matches!(
            DomainValidator::validate_context(&ctx),
            Err(DomainError::DuplicateTable { key, .. }) if key == "LineItem"
        ));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let table = TableDefinition::new("product")
            .column(ColumnDefinition::new("unit_price", "decimal"))
            .column(ColumnDefinition::new("unitPrice", "decimal"));
        assert!(matches!(
            DomainValidator::validate_table(&table),
            Err(DomainError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn rejects_multiple_primary_keys() {
        let table = TableDefinition::new("pair")
            .column(ColumnDefinition::new("a", "int").primary())
            .column(ColumnDefinition::new("b", "int").primary());
        assert_eq!(
            DomainValidator::validate_table(&table),
            Err(DomainError::MultiplePrimaryKeys {
                table: "pair".into(),
                columns: vec!["a".into(), "b".into()]
            })
        );
    }

    #[test]
    fn rejects_audit_column_names() {
        let table =
            TableDefinition::new("event").column(ColumnDefinition::new("created_at", "timestamp"));
        assert!(matches!(
            DomainValidator::validate_table(&table),
            Err(DomainError::ReservedColumn { reserved: "createdAt", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_paths() {
        let files = vec![
            GeneratedFile::new("README.md", "a"),
            GeneratedFile::new("README.md", "b"),
        ];
        assert_eq!(
            DomainValidator::validate_files(&files),
            Err(DomainError::DuplicatePath {
                path: "README.md".into()
            })
        );
    }
}
