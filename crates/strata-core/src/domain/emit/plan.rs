//! Resolved view of a `ProjectContext`.
//!
//! Every decision that more than one layer depends on is made here, once:
//! identifiers, primary keys, type mappings and screen data sources. The
//! emitters only format what the plan already settled, which is what keeps
//! the schema, the routes and the pages agreeing with each other.

use crate::domain::{
    entities::{
        ApiDescriptor, ColumnDefinition, Diagnostic, ProjectContext, ScreenDefinition,
        TableDefinition, normalize_route,
    },
    naming::Identifier,
    types::{Scalar, TypeMapper, TypeMapping, TypeResolution},
    value_objects::{DatabaseEngine, ScreenKind},
};

/// Name of the conventional and synthesized key column.
pub const CONVENTIONAL_KEY: &str = "id";

/// Largest value a Prisma `Int` column holds.
const INT_MAX: i32 = i32::MAX;

/// Audit column as seen by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditColumn {
    pub field: &'static str,
    pub storage: &'static str,
    pub label: &'static str,
    pub attributes: &'static str,
}

pub const AUDIT: [AuditColumn; 2] = [
    AuditColumn {
        field: "createdAt",
        storage: "created_at",
        label: "Created At",
        attributes: "@default(now())",
    },
    AuditColumn {
        field: "updatedAt",
        storage: "updated_at",
        label: "Updated At",
        attributes: "@updatedAt",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Marked `primaryKey: true`.
    Declared,
    /// An unmarked column named `id`.
    Conventional,
    /// No candidate; an `id` column is added.
    Synthesized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDefault {
    AutoIncrement,
    Uuid,
}

impl KeyDefault {
    pub const fn attribute(&self) -> &'static str {
        match self {
            Self::AutoIncrement => "@default(autoincrement())",
            Self::Uuid => "@default(uuid())",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub ident: Identifier,
    pub semantic: String,
    pub resolution: TypeResolution,
    pub nullable: bool,
    pub unique: bool,
    pub references: Option<String>,
    pub is_key: bool,
}

impl ColumnPlan {
    fn from_definition(column: &ColumnDefinition, is_key: bool) -> Self {
        Self {
            ident: Identifier::parse(&column.name),
            semantic: column.ty.clone(),
            resolution: TypeMapper::resolve(&column.ty),
            nullable: !is_key && column.is_nullable(),
            unique: column.unique && !is_key,
            references: column.references.clone(),
            is_key,
        }
    }

    fn synthesized_key() -> Self {
        Self {
            ident: Identifier::parse(CONVENTIONAL_KEY),
            semantic: "uuid".to_string(),
            resolution: TypeMapper::resolve("uuid"),
            nullable: false,
            unique: false,
            references: None,
            is_key: true,
        }
    }

    pub fn mapping(&self) -> &TypeMapping {
        &self.resolution.mapping
    }

    /// Schema field name.
    pub fn field(&self) -> String {
        self.ident.lower_camel()
    }

    /// Storage column name.
    pub fn storage(&self) -> String {
        self.ident.snake()
    }

    pub fn label(&self) -> String {
        self.ident.title()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    pub name: String,
    pub ident: Identifier,
    /// Declared order; a synthesized key is prepended.
    pub columns: Vec<ColumnPlan>,
    pub key_index: usize,
    pub key_origin: KeyOrigin,
    pub key_default: Option<KeyDefault>,
}

impl TablePlan {
    fn build(module: &str, table: &TableDefinition, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let ident = Identifier::parse(&table.name);
        let subject = format!("{module}.{}", table.name);

        let marked = table.columns.iter().position(|c| c.primary_key);
        let conventional = table
            .columns
            .iter()
            .position(|c| Identifier::parse(&c.name).words() == [CONVENTIONAL_KEY]);

        let (key_origin, declared_key) = match (marked, conventional) {
            (Some(i), _) => (KeyOrigin::Declared, Some(i)),
            (None, Some(i)) => (KeyOrigin::Conventional, Some(i)),
            (None, None) => (KeyOrigin::Synthesized, None),
        };

        let mut columns = Vec::with_capacity(table.columns.len() + 1);
        if declared_key.is_none() {
            columns.push(ColumnPlan::synthesized_key());
            diagnostics.push(Diagnostic::info(
                &subject,
                format!("no primary key declared; added '{CONVENTIONAL_KEY}' (uuid)"),
            ));
        }
        for (i, column) in table.columns.iter().enumerate() {
            columns.push(ColumnPlan::from_definition(column, Some(i) == declared_key));
        }

        let key_index = columns.iter().position(|c| c.is_key).unwrap_or(0);
        let key = &columns[key_index];
        let key_default = if key_origin == KeyOrigin::Synthesized {
            Some(KeyDefault::Uuid)
        } else if key.mapping().storage.scalar.is_integer() {
            Some(KeyDefault::AutoIncrement)
        } else if key.mapping().storage.is_uuid() {
            Some(KeyDefault::Uuid)
        } else {
            None
        };

        if key_default.is_none() {
            diagnostics.push(Diagnostic::info(
                &subject,
                format!(
                    "key '{}' has no default; clients must supply it on create",
                    key.field()
                ),
            ));
        }

        for column in &columns {
            if column.resolution.is_fallback() && !column.semantic.is_empty() {
                diagnostics.push(Diagnostic::warning(
                    format!("{subject}.{}", column.ident.lower_camel()),
                    format!(
                        "unrecognized type '{}'; stored as {}",
                        column.semantic,
                        column.mapping().storage.scalar.as_str()
                    ),
                ));
            } else if column.resolution.is_fallback() {
                diagnostics.push(Diagnostic::warning(
                    format!("{subject}.{}", column.ident.lower_camel()),
                    "no type given; stored as String",
                ));
            }
        }

        Self {
            name: table.name.clone(),
            ident,
            columns,
            key_index,
            key_origin,
            key_default,
        }
    }

    pub fn key(&self) -> &ColumnPlan {
        &self.columns[self.key_index]
    }

    /// Declared columns other than the key, in order.
    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnPlan> {
        self.columns.iter().filter(|c| !c.is_key)
    }

    /// Schema model name.
    pub fn model(&self) -> String {
        self.ident.upper_camel()
    }

    /// Prisma client accessor, `prisma.<accessor>`.
    pub fn accessor(&self) -> String {
        self.ident.lower_camel()
    }

    /// Endpoint segment.
    pub fn segment(&self) -> String {
        self.ident.kebab()
    }

    /// Expression turning the `req.params` value into a key.
    pub fn key_param_expr(&self, raw: &str) -> String {
        match self.key().mapping().storage.scalar {
            Scalar::Int => format!("Number({raw})"),
            Scalar::BigInt => format!("BigInt({raw})"),
            _ => raw.to_string(),
        }
    }

    /// Condition that holds when a `req.params` value can never name a row.
    /// `None` for keys stored as strings.
    pub fn key_param_rejects(&self, raw: &str) -> Option<String> {
        match self.key().mapping().storage.scalar {
            Scalar::Int => Some(format!(
                "!Number.isInteger(Number({raw})) || Math.abs(Number({raw})) > {INT_MAX}"
            )),
            Scalar::BigInt => Some(format!("!/^-?\\d+$/.test({raw})")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenPlan {
    pub name: String,
    pub ident: Identifier,
    pub kind: ScreenKind,
    pub route: String,
    /// Index into the module's tables, `None` when the module has none.
    pub source: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModulePlan {
    pub name: String,
    pub ident: Identifier,
    pub description: String,
    pub status: String,
    pub tables: Vec<TablePlan>,
    pub screens: Vec<ScreenPlan>,
    pub apis: Vec<ApiDescriptor>,
}

impl ModulePlan {
    /// Route file stem and URL prefix.
    pub fn segment(&self) -> String {
        self.ident.kebab()
    }

    pub fn source_of(&self, screen: &ScreenPlan) -> Option<&TablePlan> {
        screen.source.and_then(|i| self.tables.get(i))
    }

    /// React component name of a screen's page.
    pub fn page_component(&self, screen: &ScreenPlan) -> String {
        format!("{}{}", self.ident.upper_camel(), screen.ident.upper_camel())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPlan {
    pub project_id: String,
    pub project_name: String,
    pub ident: Identifier,
    pub domain: String,
    pub database: DatabaseEngine,
    pub modules: Vec<ModulePlan>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ProjectPlan {
    /// Resolve a validated context.
    pub fn build(context: &ProjectContext) -> Self {
        let mut diagnostics = Vec::new();

        if !context.database.is_recognized() {
            diagnostics.push(Diagnostic::warning(
                "database",
                format!(
                    "unknown engine '{}'; rendering as PostgreSQL",
                    context.database
                ),
            ));
        }

        let known_tables: Vec<Identifier> = context
            .tables()
            .map(|(_, t)| Identifier::parse(&t.name))
            .collect();

        let modules = context
            .modules
            .iter()
            .map(|module| {
                let tables: Vec<TablePlan> = module
                    .tables
                    .iter()
                    .map(|t| TablePlan::build(&module.name, t, &mut diagnostics))
                    .collect();

                for table in &tables {
                    for column in &table.columns {
                        let Some(target) = &column.references else {
                            continue;
                        };
                        if !known_tables.contains(&Identifier::parse(target)) {
                            diagnostics.push(Diagnostic::info(
                                format!("{}.{}.{}", module.name, table.name, column.field()),
                                format!("references unknown table '{target}'"),
                            ));
                        }
                    }
                }

                let screens = module
                    .screens
                    .iter()
                    .map(|screen| {
                        let source =
                            resolve_source(&module.name, screen, &tables, &mut diagnostics);
                        ScreenPlan {
                            name: screen.name.clone(),
                            ident: Identifier::parse(&screen.name),
                            kind: screen.kind.clone(),
                            route: normalize_route(&screen.route),
                            source,
                        }
                    })
                    .collect();

                ModulePlan {
                    name: module.name.clone(),
                    ident: Identifier::parse(&module.name),
                    description: module.description.clone(),
                    status: module.status.clone(),
                    tables,
                    screens,
                    apis: module.apis.clone(),
                }
            })
            .collect();

        Self {
            project_id: context.project_id.clone(),
            project_name: context.display_name().to_string(),
            ident: Identifier::parse(context.display_name()),
            domain: context.domain.clone(),
            database: context.database.clone(),
            modules,
            diagnostics,
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = (&ModulePlan, &TablePlan)> {
        self.modules
            .iter()
            .flat_map(|m| m.tables.iter().map(move |t| (m, t)))
    }

    pub fn screens(&self) -> impl Iterator<Item = (&ModulePlan, &ScreenPlan)> {
        self.modules
            .iter()
            .flat_map(|m| m.screens.iter().map(move |s| (m, s)))
    }
}

/// Explicit binding if it resolves, else the first table.
fn resolve_source(
    module: &str,
    screen: &ScreenDefinition,
    tables: &[TablePlan],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<usize> {
    let subject = format!("{module}.{}", screen.name);

    if tables.is_empty() {
        diagnostics.push(Diagnostic::info(
            subject,
            "module has no tables; emitting a placeholder page",
        ));
        return None;
    }

    let Some(wanted) = &screen.table else {
        return Some(0);
    };

    let wanted_ident = Identifier::parse(wanted);
    match tables.iter().position(|t| t.ident == wanted_ident) {
        Some(i) => Some(i),
        None => {
            diagnostics.push(Diagnostic::warning(
                subject,
                format!(
                    "table '{wanted}' not found in module; using '{}'",
                    tables[0].name
                ),
            ));
            Some(0)
        }
    }
}
