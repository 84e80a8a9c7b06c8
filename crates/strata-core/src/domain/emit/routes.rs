//! Service layer: one Express router per module, five endpoints per table.

use super::{
    Emitter,
    plan::{ColumnPlan, ModulePlan, ProjectPlan, TablePlan},
    source::{SourceBuilder, ts_string},
};
use crate::domain::{
    entities::GeneratedFile,
    types::{NativeHint, Scalar},
};

pub const HTTP_PATH: &str = "backend/src/http.ts";
pub const ENTRY_PATH: &str = "backend/src/index.ts";
pub const API_PORT: u16 = 3001;

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteEmitter;

impl Emitter for RouteEmitter {
    fn name(&self) -> &'static str {
        "routes"
    }

    fn emit(&self, plan: &ProjectPlan) -> Vec<GeneratedFile> {
        let mut files: Vec<GeneratedFile> = plan
            .modules
            .iter()
            .map(|module| GeneratedFile::new(router_path(module).as_str(), render_router(module)))
            .collect();
        files.push(GeneratedFile::new(HTTP_PATH, HTTP_TS));
        files.push(GeneratedFile::new(ENTRY_PATH, render_entry(plan)));
        files
    }
}

pub fn router_path(module: &ModulePlan) -> String {
    format!("backend/src/routes/{}.ts", module.segment())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Self; 5] = [
        Self::List,
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    pub const fn method(&self) -> &'static str {
        match self {
            Self::List | Self::Get => "GET",
            Self::Create => "POST",
            Self::Update => "PUT",
            Self::Delete => "DELETE",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    const fn takes_key(&self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Delete)
    }
}

/// Router-relative path of one endpoint, e.g. `/invoice/:id`.
pub fn endpoint_path(table: &TablePlan, op: Operation) -> String {
    if op.takes_key() {
        format!("/{}/:{}", table.segment(), table.key().field())
    } else {
        format!("/{}", table.segment())
    }
}

/// Full mounted path, e.g. `/api/billing/invoice/:id`.
pub fn mounted_path(module: &ModulePlan, table: &TablePlan, op: Operation) -> String {
    format!("/api/{}{}", module.segment(), endpoint_path(table, op))
}

/// Coercion applied by `pick` in `http.ts`.
fn field_kind(column: &ColumnPlan) -> &'static str {
    let storage = column.mapping().storage;
    match storage.scalar {
        Scalar::Int | Scalar::Float => "number",
        Scalar::BigInt => "bigint",
        Scalar::Boolean => "boolean",
        Scalar::Json => "json",
        Scalar::Bytes => "bytes",
        Scalar::DateTime if storage.native == Some(NativeHint::Time) => "time",
        Scalar::DateTime => "datetime",
        Scalar::Decimal | Scalar::String => "string",
    }
}

fn field_spec<'a>(columns: impl Iterator<Item = &'a ColumnPlan>) -> String {
    let entries: Vec<String> = columns
        .map(|c| format!("{}: '{}'", c.field(), field_kind(c)))
        .collect();
    if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    }
}

pub fn render_router(module: &ModulePlan) -> String {
    let mut out = SourceBuilder::new();
    out.line(format!(
        "// {} module routes. Generated by strata.",
        module.ident.title()
    ));
    if !module.tables.is_empty() {
        out.line("import { Prisma } from '@prisma/client';");
    }
    out.line("import { Router } from 'express';");
    if !module.tables.is_empty() {
        out.line("import { prisma } from '../db/client';");
        out.line("import { type FieldSpec, isNotFound, pick } from '../http';");
    }
    out.blank();
    out.line("const router = Router();");

    for table in &module.tables {
        out.blank();
        render_table(&mut out, module, table);
    }

    out.blank();
    out.line("export default router;");
    out.finish()
}

fn render_table(out: &mut SourceBuilder, module: &ModulePlan, table: &TablePlan) {
    let model = table.model();
    let accessor = table.accessor();
    let key = table.key().field();
    let label = table.ident.title();
    let var = table.ident.lower_camel();

    let create_columns = table
        .columns
        .iter()
        .filter(|c| !c.is_key || table.key_default.is_none());

    out.line(format!("// {label}"));
    out.line(format!(
        "const {var}CreateFields: FieldSpec = {};",
        field_spec(create_columns)
    ));
    out.line(format!(
        "const {var}UpdateFields: FieldSpec = {};",
        field_spec(table.data_columns())
    ));

    let raw_key = format!("req.params.{key}");
    let key_value = table.key_param_expr(&raw_key);
    let key_rejects = table.key_param_rejects(&raw_key);
    let where_clause = format!("{{ {key}: {key_value} }}");
    let not_found = format!(
        "res.status(404).json({{ error: {} }});",
        ts_string(&format!("{label} not found"))
    );

    // list
    let path = endpoint_path(table, Operation::List);
    out.blank();
    open_handler(out, "get", &path, "_req");
    out.line(format!(
        "const rows = await prisma.{accessor}.findMany({{ orderBy: {{ createdAt: 'desc' }} }});"
    ));
    out.line("res.json(rows);");
    close_handler(out, module, "GET", &path, &format!("Failed to list {label} records"), false);

    // get
    let path = endpoint_path(table, Operation::Get);
    out.blank();
    open_handler(out, "get", &path, "req");
    guard_key(out, key_rejects.as_deref(), &not_found);
    out.line(format!(
        "const row = await prisma.{accessor}.findUnique({{ where: {where_clause} }});"
    ));
    out.open("if (!row) {");
    out.line(&not_found);
    out.line("return;");
    out.close("}");
    out.line("res.json(row);");
    close_handler(out, module, "GET", &path, &format!("Failed to load {label}"), false);

    // create
    let path = endpoint_path(table, Operation::Create);
    out.blank();
    open_handler(out, "post", &path, "req");
    out.line(format!(
        "const data = pick(req.body, {var}CreateFields) as Prisma.{model}UncheckedCreateInput;"
    ));
    out.line(format!("const row = await prisma.{accessor}.create({{ data }});"));
    out.line("res.status(201).json(row);");
    close_handler(out, module, "POST", &path, &format!("Failed to create {label}"), false);

    // update
    let path = endpoint_path(table, Operation::Update);
    out.blank();
    open_handler(out, "put", &path, "req");
    guard_key(out, key_rejects.as_deref(), &not_found);
    out.line(format!(
        "const data = pick(req.body, {var}UpdateFields) as Prisma.{model}UncheckedUpdateInput;"
    ));
    out.line(format!(
        "const row = await prisma.{accessor}.update({{ where: {where_clause}, data }});"
    ));
    out.line("res.json(row);");
    close_handler(out, module, "PUT", &path, &format!("Failed to update {label}"), true);

    // delete
    let path = endpoint_path(table, Operation::Delete);
    out.blank();
    open_handler(out, "delete", &path, "req");
    guard_key(out, key_rejects.as_deref(), &not_found);
    out.line(format!(
        "await prisma.{accessor}.delete({{ where: {where_clause} }});"
    ));
    out.line("res.status(204).end();");
    close_handler(out, module, "DELETE", &path, &format!("Failed to delete {label}"), true);
}

fn open_handler(out: &mut SourceBuilder, verb: &str, path: &str, req: &str) {
    out.open(format!(
        "router.{verb}({}, async ({req}, res) => {{",
        ts_string(path)
    ));
    out.open("try {");
}

/// A key param that cannot parse answers 404 before the query runs.
fn guard_key(out: &mut SourceBuilder, rejects: Option<&str>, not_found: &str) {
    let Some(condition) = rejects else {
        return;
    };
    out.open(format!("if ({condition}) {{"));
    out.line(not_found);
    out.line("return;");
    out.close("}");
}

fn close_handler(
    out: &mut SourceBuilder,
    module: &ModulePlan,
    method: &str,
    path: &str,
    message: &str,
    not_found: bool,
) {
    out.reopen("} catch (err) {");
    if not_found {
        out.open("if (isNotFound(err)) {");
        out.line("res.status(404).json({ error: 'Record not found' });");
        out.line("return;");
        out.close("}");
    }
    out.line(format!(
        "console.error({}, err);",
        ts_string(&format!("{method} /api/{}{path} failed", module.segment()))
    ));
    out.line(format!(
        "res.status(500).json({{ error: {} }});",
        ts_string(message)
    ));
    out.close("}");
    out.close("});");
}

pub fn render_entry(plan: &ProjectPlan) -> String {
    let mut out = SourceBuilder::new();
    out.line("import cors from 'cors';");
    out.line("import express from 'express';");
    for module in &plan.modules {
        out.line(format!(
            "import {}Router from './routes/{}';",
            module.ident.lower_camel(),
            module.segment()
        ));
    }
    out.blank();
    out.line("const app = express();");
    out.blank();
    out.line("app.use(cors());");
    out.line("app.use(express.json());");
    out.line("// BigInt values are sent as strings.");
    out.line(
        "app.set('json replacer', (_key: string, value: unknown) => (typeof value === 'bigint' ? value.toString() : value));",
    );
    out.blank();
    out.open("app.get('/api/health', (_req, res) => {");
    out.line("res.json({ status: 'ok' });");
    out.close("});");
    out.blank();
    for module in &plan.modules {
        out.line(format!(
            "app.use({}, {}Router);",
            ts_string(&format!("/api/{}", module.segment())),
            module.ident.lower_camel()
        ));
    }
    out.blank();
    out.line(format!("const port = Number(process.env.PORT ?? {API_PORT});"));
    out.open("app.listen(port, () => {");
    out.line(format!(
        "console.log({} + port);",
        ts_string(&format!("{} API listening on port ", plan.project_name))
    ));
    out.close("});");
    out.finish()
}

const HTTP_TS: &str = r#"export type FieldKind =
  | 'string'
  | 'number'
  | 'bigint'
  | 'boolean'
  | 'json'
  | 'bytes'
  | 'datetime'
  | 'time';

export type FieldSpec = Record<string, FieldKind>;

function coerce(value: unknown, kind: FieldKind): unknown {
  if (value === null || value === '') {
    return null;
  }
  switch (kind) {
    case 'number':
      return typeof value === 'string' ? Number(value) : value;
    case 'bigint':
      return typeof value === 'string' || typeof value === 'number' ? BigInt(value) : value;
    case 'boolean':
      return value === true || value === 'true' || value === 'on';
    case 'json':
      if (typeof value === 'string') {
        try {
          return JSON.parse(value);
        } catch {
          return value;
        }
      }
      return value;
    case 'bytes':
      return typeof value === 'string' ? Buffer.from(value, 'base64') : value;
    case 'datetime':
      return typeof value === 'string' ? new Date(value) : value;
    case 'time':
      return typeof value === 'string' ? new Date(`1970-01-01T${value}`) : value;
    default:
      return value;
  }
}

/** Copy only the whitelisted fields of a request body, coerced per kind. */
export function pick(body: unknown, fields: FieldSpec): Record<string, unknown> {
  const source = (typeof body === 'object' && body !== null ? body : {}) as Record<string, unknown>;
  const data: Record<string, unknown> = {};
  for (const [name, kind] of Object.entries(fields)) {
    if (name in source) {
      data[name] = coerce(source[name], kind);
    }
  }
  return data;
}

/** Prisma raises P2025 when update/delete finds no record. */
export function isNotFound(err: unknown): boolean {
  return (
    typeof err === 'object' &&
    err !== null &&
    'code' in err &&
    (err as { code?: unknown }).code === 'P2025'
  );
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ArtifactClass, ColumnDefinition, ModuleDefinition, ProjectContext, TableDefinition,
    };

    fn plan(module: ModuleDefinition) -> ProjectPlan {
        ProjectPlan::build(
            &ProjectContext::builder()
                .id("demo")
                .name("Demo")
                .module(module)
                .build()
                .unwrap(),
        )
    }

    fn billing() -> ProjectPlan {
        plan(
            ModuleDefinition::new("Billing").table(
                TableDefinition::new("invoice")
                    .column(ColumnDefinition::new("id", "uuid").primary())
                    .column(ColumnDefinition::new("amount", "decimal"))
                    .column(ColumnDefinition::new("status", "text")),
            ),
        )
    }

    #[test]
    fn emits_five_endpoints_per_table() {
        let plan = billing();
        let router = render_router(&plan.modules[0]);
        for needle in [
            "router.get('/invoice', async",
            "router.get('/invoice/:id', async",
            "router.post('/invoice', async",
            "router.put('/invoice/:id', async",
            "router.delete('/invoice/:id', async",
        ] {
            assert_eq!(router.matches(needle).count(), 1, "{needle}");
        }
        assert_eq!(router.matches("} catch (err) {").count(), 5);
        assert!(router.contains("res.status(201).json(row);"));
        assert!(router.contains("res.status(204).end();"));
    }

    #[test]
    fn handlers_report_generic_errors() {
        let plan = billing();
        let router = render_router(&plan.modules[0]);
        assert!(router.contains("res.status(404).json({ error: 'Invoice not found' });"));
        assert_eq!(router.matches("if (isNotFound(err)) {").count(), 2);
        assert_eq!(router.matches("res.status(500)").count(), 5);
        assert!(!router.contains("err.message"));
    }

    #[test]
    fn whitelists_body_fields() {
        let plan = billing();
        let router = render_router(&plan.modules[0]);
        assert!(router.contains(
            "const invoiceCreateFields: FieldSpec = { amount: 'string', status: 'string' };"
        ));
        assert!(router.contains("as Prisma.InvoiceUncheckedCreateInput"));
    }

    #[test]
    fn key_without_default_is_accepted_on_create() {
        let plan = plan(
            ModuleDefinition::new("Catalog").table(
                TableDefinition::new("product")
                    .column(ColumnDefinition::new("sku", "string").primary())
                    .column(ColumnDefinition::new("price", "float")),
            ),
        );
        let router = render_router(&plan.modules[0]);
        assert!(router.contains("{ sku: 'string', price: 'number' }"));
        assert!(router.contains("router.get('/product/:sku', async"));
        assert!(router.contains("where: { sku: req.params.sku }"));
    }

    #[test]
    fn missing_key_falls_back_to_id() {
        let plan = plan(
            ModuleDefinition::new("Notes")
                .table(TableDefinition::new("note").column(ColumnDefinition::new("body", "text"))),
        );
        let router = render_router(&plan.modules[0]);
        assert!(router.contains("router.put('/note/:id', async"));
        assert!(router.contains("where: { id: req.params.id }"));
    }

    #[test]
    fn integer_keys_are_coerced() {
        let plan = plan(
            ModuleDefinition::new("Ops").table(
                TableDefinition::new("job run")
                    .column(ColumnDefinition::new("id", "integer").primary())
                    .column(ColumnDefinition::new("total", "bigint")),
            ),
        );
        let router = render_router(&plan.modules[0]);
        assert!(router.contains("router.get('/job-run/:id', async"));
        assert!(router.contains("where: { id: Number(req.params.id) }"));
        assert!(router.contains("prisma.jobRun.findMany"));
        assert!(router.contains("{ total: 'bigint' }"));
    }

    #[test]
    fn unparsable_integer_keys_are_not_found() {
        let plan = plan(
            ModuleDefinition::new("Ops").table(
                TableDefinition::new("job run")
                    .column(ColumnDefinition::new("id", "integer").primary()),
            ),
        );
        let router = render_router(&plan.modules[0]);
        let guard = "if (!Number.isInteger(Number(req.params.id)) \
                     || Math.abs(Number(req.params.id)) > 2147483647) {";
        // get, update and delete; the list and create handlers take no key
        assert_eq!(router.matches(guard).count(), 3);
        assert_eq!(router.matches("{ error: 'Job Run not found' }").count(), 4);

        let get = &router[router.find("router.get('/job-run/:id'").unwrap()..];
        assert!(get.find(guard).unwrap() < get.find("findUnique").unwrap());
    }

    #[test]
    fn bigint_keys_are_checked_before_parsing() {
        let plan = plan(
            ModuleDefinition::new("Ledger").table(
                TableDefinition::new("entry")
                    .column(ColumnDefinition::new("id", "bigserial").primary()),
            ),
        );
        let router = render_router(&plan.modules[0]);
        assert_eq!(router.matches("if (!/^-?\\d+$/.test(req.params.id)) {").count(), 3);
        assert!(router.contains("where: { id: BigInt(req.params.id) }"));
    }

    #[test]
    fn string_keys_are_not_guarded() {
        let plan = billing();
        let router = render_router(&plan.modules[0]);
        assert!(!router.contains("Number.isInteger"));
        assert!(!router.contains(".test(req.params"));
    }

    #[test]
    fn entry_mounts_every_module() {
        let plan = ProjectPlan::build(
            &ProjectContext::builder()
                .id("x")
                .module(ModuleDefinition::new("Order Items"))
                .module(ModuleDefinition::new("Billing"))
                .build()
                .unwrap(),
        );
        let entry = render_entry(&plan);
        assert!(entry.contains("import orderItemsRouter from './routes/order-items';"));
        assert!(entry.contains("app.use('/api/order-items', orderItemsRouter);"));
        assert!(entry.contains("app.use('/api/billing', billingRouter);"));
        assert!(entry.contains("process.env.PORT ?? 3001"));
    }

    #[test]
    fn emitted_files_are_service_class() {
        let files = RouteEmitter.emit(&billing());
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, [
            "backend/src/routes/billing.ts",
            "backend/src/http.ts",
            "backend/src/index.ts"
        ]);
        assert!(files.iter().all(|f| f.class == ArtifactClass::Service));
    }

    #[test]
    fn mounted_paths_for_docs() {
        let plan = billing();
        let module = &plan.modules[0];
        assert_eq!(
            mounted_path(module, &module.tables[0], Operation::Delete),
            "/api/billing/invoice/:id"
        );
    }
}
