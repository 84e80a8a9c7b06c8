//! The input model: one `ProjectContext` per materialization request.
//!
//! Documents use camelCase keys:
//!
//! ```json
//! {
//!   "projectId": "billing-portal",
//!   "projectName": "Billing Portal",
//!   "domain": "finance",
//!   "database": "postgres",
//!   "modules": [{
//!     "name": "Billing",
//!     "tables": [{ "name": "invoice", "columns": [
//!       { "name": "id", "type": "uuid", "primaryKey": true },
//!       { "name": "amount", "type": "decimal", "nullable": false }
//!     ]}],
//!     "screens": [{ "name": "Invoices", "kind": "list", "route": "/invoices" }]
//!   }]
//! }
//! ```

use super::DomainError;
use crate::domain::value_objects::{DatabaseEngine, ScreenKind};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// ProjectContext
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub database: DatabaseEngine,
    #[serde(default)]
    pub modules: Vec<ModuleDefinition>,
}

impl ProjectContext {
    pub fn builder() -> ProjectContextBuilder {
        ProjectContextBuilder::default()
    }

    /// Human name, falling back to the id when none was given.
    pub fn display_name(&self) -> &str {
        if self.project_name.trim().is_empty() {
            &self.project_id
        } else {
            &self.project_name
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = (&ModuleDefinition, &TableDefinition)> {
        self.modules
            .iter()
            .flat_map(|m| m.tables.iter().map(move |t| (m, t)))
    }
}

#[derive(Debug, Default)]
pub struct ProjectContextBuilder {
    project_id: Option<String>,
    project_name: Option<String>,
    domain: String,
    database: DatabaseEngine,
    modules: Vec<ModuleDefinition>,
}

impl ProjectContextBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn database(mut self, database: impl Into<DatabaseEngine>) -> Self {
        self.database = database.into();
        self
    }

    pub fn module(mut self, module: ModuleDefinition) -> Self {
        self.modules.push(module);
        self
    }

    pub fn build(self) -> Result<ProjectContext, DomainError> {
        let project_id = self
            .project_id
            .ok_or(DomainError::MissingRequiredField { field: "projectId" })?;

        Ok(ProjectContext {
            project_name: self.project_name.unwrap_or_else(|| project_id.clone()),
            project_id,
            domain: self.domain,
            database: self.database,
            modules: self.modules,
        })
    }
}

// ============================================================================
// ModuleDefinition
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
    #[serde(default)]
    pub apis: Vec<ApiDescriptor>,
    #[serde(default)]
    pub screens: Vec<ScreenDefinition>,
}

impl ModuleDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            status: String::new(),
            tables: Vec::new(),
            apis: Vec::new(),
            screens: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    pub fn api(mut self, api: ApiDescriptor) -> Self {
        self.apis.push(api);
        self
    }

    pub fn screen(mut self, screen: ScreenDefinition) -> Self {
        self.screens.push(screen);
        self
    }
}

// ============================================================================
// TableDefinition / ColumnDefinition
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    /// Semantic type, resolved by `TypeMapper`.
    #[serde(rename = "type", default)]
    pub ty: String,
    #[serde(default)]
    pub primary_key: bool,
    /// Name of another table. Advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub unique: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            primary_key: false,
            references: None,
            nullable: None,
            unique: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = Some(false);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>) -> Self {
        self.references = Some(table.into());
        self
    }

    /// Nullable unless declared `nullable: false` or marked primary.
    pub fn is_nullable(&self) -> bool {
        !self.primary_key && self.nullable.unwrap_or(true)
    }
}

// ============================================================================
// ScreenDefinition / ApiDescriptor
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDefinition {
    pub name: String,
    pub kind: ScreenKind,
    #[serde(default = "root_route", deserialize_with = "deserialize_route")]
    pub route: String,
    /// Explicit data source. Falls back to the module's first table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl ScreenDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<ScreenKind>, route: &str) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            route: normalize_route(route),
            table: None,
        }
    }

    pub fn bound_to(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Descriptive only: the emitted endpoints are always the CRUD set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDescriptor {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub description: String,
}

impl ApiDescriptor {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            description: description.into(),
        }
    }
}

/// Leading `/`, no duplicate or trailing slashes. Empty becomes `/`.
pub fn normalize_route(raw: &str) -> String {
    let segments: Vec<&str> = raw
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

fn root_route() -> String {
    "/".to_string()
}

fn deserialize_route<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_route(&raw))
}
