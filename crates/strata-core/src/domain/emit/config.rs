//! Configuration layer: manifests, tool configuration and the README.

use super::{
    Emitter,
    plan::{ModulePlan, ProjectPlan, TablePlan},
    routes::{API_PORT, Operation, mounted_path, router_path},
    screens::{page_path, shell_route},
    source::{html_escape, one_line},
    template::RenderContext,
};
use crate::domain::entities::{GeneratedFile, RunCommands};
use serde::Serialize;

pub const README_PATH: &str = "README.md";
pub const MANIFEST_PATH: &str = "project.json";

/// Generator tag recorded in `project.json`.
pub const GENERATOR: &str = "strata";

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigEmitter;

impl Emitter for ConfigEmitter {
    fn name(&self) -> &'static str {
        "config"
    }

    fn emit(&self, plan: &ProjectPlan) -> Vec<GeneratedFile> {
        let ctx = render_context(plan);

        let mut files = vec![
            GeneratedFile::new(README_PATH, render_readme(plan)),
            GeneratedFile::new(MANIFEST_PATH, render_manifest(plan)),
        ];
        files.extend(
            STATIC_FILES
                .iter()
                .map(|(path, template)| GeneratedFile::new(*path, ctx.render(template))),
        );
        files
    }
}

fn render_context(plan: &ProjectPlan) -> RenderContext {
    RenderContext::new(plan.project_name.clone())
        .with_variable("PROJECT_NAME_HTML", html_escape(&one_line(&plan.project_name)))
        .with_variable("DATABASE_URL", plan.database.example_url(&plan.ident.snake()))
        .with_variable("API_PORT", API_PORT.to_string())
}

// ============================================================================
// README
// ============================================================================

pub fn render_readme(plan: &ProjectPlan) -> String {
    let commands = RunCommands::default();
    let mut out = String::new();

    push(&mut out, &format!("# {}", one_line(&plan.project_name)));
    out.push('\n');
    if !plan.domain.trim().is_empty() {
        push(&mut out, &one_line(&plan.domain));
        out.push('\n');
    }
    push(
        &mut out,
        &format!(
            "Generated by {GENERATOR} from the `{}` project model. Regenerate instead of editing.",
            plan.project_id
        ),
    );
    out.push('\n');

    push(&mut out, "## Stack");
    out.push('\n');
    push(
        &mut out,
        &format!(
            "- `backend/`: Express + TypeScript + Prisma ({})",
            plan.database.provider()
        ),
    );
    push(&mut out, "- `frontend/`: React + React Router + Vite");
    out.push('\n');

    push(&mut out, "## Modules");
    for module in &plan.modules {
        out.push('\n');
        render_module(&mut out, module);
    }
    if plan.modules.is_empty() {
        out.push('\n');
        push(&mut out, "_No modules declared._");
    }
    out.push('\n');

    push(&mut out, "## Endpoints");
    out.push('\n');
    let mut any = false;
    for (module, table) in plan.tables() {
        if !any {
            push(&mut out, "| Method | Path | Operation |");
            push(&mut out, "|--------|------|-----------|");
            any = true;
        }
        for op in Operation::ALL {
            push(
                &mut out,
                &format!(
                    "| {} | `{}` | {} {} |",
                    op.method(),
                    mounted_path(module, table, op),
                    op.as_str(),
                    table.segment()
                ),
            );
        }
    }
    if !any {
        push(&mut out, "_No tables declared; only `GET /api/health` is served._");
    }
    out.push('\n');

    push(&mut out, "## Getting started");
    out.push('\n');
    push(&mut out, "```bash");
    push(&mut out, "cp .env.example backend/.env");
    push(&mut out, &commands.install);
    push(&mut out, &commands.migrate);
    push(&mut out, &commands.start);
    push(&mut out, "```");
    out.push('\n');
    push(
        &mut out,
        &format!(
            "The API listens on port {API_PORT}; the Vite dev server proxies `/api` to it."
        ),
    );

    out
}

fn render_module(out: &mut String, module: &ModulePlan) {
    push(out, &format!("### {}", one_line(&module.name)));
    out.push('\n');
    if !module.description.trim().is_empty() {
        push(out, &one_line(&module.description));
        out.push('\n');
    }
    if !module.status.trim().is_empty() {
        push(out, &format!("Status: {}", one_line(&module.status)));
        out.push('\n');
    }

    push(out, &format!("Router: `{}`", router_path(module)));
    out.push('\n');

    if !module.tables.is_empty() {
        push(out, "Tables:");
        for table in &module.tables {
            push(out, &format!("- {}", table_summary(table)));
        }
        out.push('\n');
    }

    if !module.screens.is_empty() {
        push(out, "Screens:");
        for screen in &module.screens {
            let source = module
                .source_of(screen)
                .map(|t| format!(", table `{}`", t.segment()))
                .unwrap_or_default();
            push(
                out,
                &format!(
                    "- {} ({}, `{}`{source})",
                    one_line(&screen.name),
                    screen.kind.as_str(),
                    shell_route(module, screen)
                ),
            );
        }
        out.push('\n');
    }

    if !module.apis.is_empty() {
        push(out, "Declared APIs:");
        for api in &module.apis {
            let description = if api.description.trim().is_empty() {
                String::new()
            } else {
                format!(": {}", one_line(&api.description))
            };
            push(
                out,
                &format!(
                    "- `{} {}`{description}",
                    one_line(&api.method).to_uppercase(),
                    one_line(&api.path)
                ),
            );
        }
        out.push('\n');
    }
}

fn table_summary(table: &TablePlan) -> String {
    format!(
        "`{}` (model `{}`, key `{}`, {} columns)",
        table.segment(),
        table.model(),
        table.key().field(),
        table.columns.len()
    )
}

fn push(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

// ============================================================================
// project.json
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    project_id: &'a str,
    project_name: &'a str,
    domain: &'a str,
    database: &'a str,
    provider: &'static str,
    generator: &'static str,
    modules: Vec<ManifestModule<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestModule<'a> {
    name: &'a str,
    slug: String,
    description: &'a str,
    status: &'a str,
    router: String,
    tables: Vec<ManifestTable>,
    screens: Vec<ManifestScreen<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestTable {
    name: String,
    model: String,
    storage: String,
    endpoint: String,
    key: String,
    columns: Vec<ManifestColumn>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestColumn {
    field: String,
    storage: String,
    semantic: String,
    storage_type: String,
    transport: &'static str,
    display: &'static str,
    nullable: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestScreen<'a> {
    name: &'a str,
    kind: &'a str,
    route: String,
    page: String,
    table: Option<String>,
}

pub fn render_manifest(plan: &ProjectPlan) -> String {
    let manifest = Manifest {
        project_id: &plan.project_id,
        project_name: &plan.project_name,
        domain: &plan.domain,
        database: plan.database.as_str(),
        provider: plan.database.provider(),
        generator: GENERATOR,
        modules: plan
            .modules
            .iter()
            .map(|module| manifest_module(plan, module))
            .collect(),
    };

    let mut json = serde_json::to_string_pretty(&manifest).unwrap_or_else(|_| "{}".to_string());
    json.push('\n');
    json
}

fn manifest_module<'a>(plan: &ProjectPlan, module: &'a ModulePlan) -> ManifestModule<'a> {
    ManifestModule {
        name: &module.name,
        slug: module.segment(),
        description: &module.description,
        status: &module.status,
        router: router_path(module),
        tables: module
            .tables
            .iter()
            .map(|table| ManifestTable {
                name: table.name.clone(),
                model: table.model(),
                storage: table.ident.snake(),
                endpoint: mounted_path(module, table, Operation::List),
                key: table.key().field(),
                columns: table
                    .columns
                    .iter()
                    .map(|column| {
                        let mapping = column.mapping();
                        ManifestColumn {
                            field: column.field(),
                            storage: column.storage(),
                            semantic: column.semantic.clone(),
                            storage_type: mapping.storage.render(&plan.database),
                            transport: mapping.transport.as_str(),
                            display: mapping.display.as_str(),
                            nullable: column.nullable,
                        }
                    })
                    .collect(),
            })
            .collect(),
        screens: module
            .screens
            .iter()
            .map(|screen| ManifestScreen {
                name: &screen.name,
                kind: screen.kind.as_str(),
                route: shell_route(module, screen),
                page: page_path(&module.page_component(screen)),
                table: module.source_of(screen).map(|t| t.name.clone()),
            })
            .collect(),
    }
}

// ============================================================================
// Static files
// ============================================================================

const STATIC_FILES: [(&str, &str); 10] = [
    (".env.example", ENV_EXAMPLE),
    (".gitignore", GITIGNORE),
    ("backend/package.json", BACKEND_PACKAGE),
    ("backend/tsconfig.json", BACKEND_TSCONFIG),
    ("frontend/package.json", FRONTEND_PACKAGE),
    ("frontend/tsconfig.json", FRONTEND_TSCONFIG),
    ("frontend/vite.config.ts", VITE_CONFIG),
    ("frontend/index.html", INDEX_HTML),
    ("backend/.gitignore", BACKEND_GITIGNORE),
    ("frontend/src/vite-env.d.ts", VITE_ENV),
];

const ENV_EXAMPLE: &str = r#"# Copy to backend/.env before running migrations.
DATABASE_URL="{{DATABASE_URL}}"
PORT={{API_PORT}}

# Read by the Vite dev server and the frontend build.
VITE_API_URL=/api
"#;

const GITIGNORE: &str = r#"node_modules/
dist/
.env
*.log
"#;

const BACKEND_GITIGNORE: &str = r#"prisma/*.db
prisma/*.db-journal
"#;

const BACKEND_PACKAGE: &str = r#"{
  "name": "{{PROJECT_NAME_KEBAB}}-backend",
  "version": "0.1.0",
  "private": true,
  "scripts": {
    "dev": "tsx watch src/index.ts",
    "build": "tsc",
    "start": "node dist/index.js",
    "prisma:generate": "prisma generate",
    "prisma:migrate": "prisma migrate dev"
  },
  "dependencies": {
    "@prisma/client": "^5.22.0",
    "cors": "^2.8.5",
    "express": "^4.21.1"
  },
  "devDependencies": {
    "@types/cors": "^2.8.17",
    "@types/express": "^4.17.21",
    "@types/node": "^22.9.0",
    "prisma": "^5.22.0",
    "tsx": "^4.19.2",
    "typescript": "^5.6.3"
  }
}
"#;

const BACKEND_TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "ES2022",
    "module": "commonjs",
    "rootDir": "src",
    "outDir": "dist",
    "strict": true,
    "esModuleInterop": true,
    "skipLibCheck": true,
    "forceConsistentCasingInFileNames": true
  },
  "include": ["src"]
}
"#;

const FRONTEND_PACKAGE: &str = r#"{
  "name": "{{PROJECT_NAME_KEBAB}}-frontend",
  "version": "0.1.0",
  "private": true,
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "tsc && vite build",
    "preview": "vite preview"
  },
  "dependencies": {
    "react": "^18.3.1",
    "react-dom": "^18.3.1",
    "react-router-dom": "^6.28.0"
  },
  "devDependencies": {
    "@types/react": "^18.3.12",
    "@types/react-dom": "^18.3.1",
    "@vitejs/plugin-react": "^4.3.3",
    "typescript": "^5.6.3",
    "vite": "^5.4.11"
  }
}
"#;

const FRONTEND_TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "ES2020",
    "lib": ["ES2020", "DOM", "DOM.Iterable"],
    "module": "ESNext",
    "moduleResolution": "bundler",
    "jsx": "react-jsx",
    "strict": true,
    "noEmit": true,
    "isolatedModules": true,
    "skipLibCheck": true
  },
  "include": ["src"]
}
"#;

const VITE_CONFIG: &str = r#"import react from '@vitejs/plugin-react';
import { defineConfig } from 'vite';

export default defineConfig({
  plugins: [react()],
  server: {
    port: 5173,
    proxy: {
      '/api': 'http://localhost:{{API_PORT}}',
    },
  },
});
"#;

const VITE_ENV: &str = r#"/// <reference types="vite/client" />
"#;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{{PROJECT_NAME_HTML}}</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ApiDescriptor, ArtifactClass, ColumnDefinition, ModuleDefinition, ProjectContext,
        ScreenDefinition, TableDefinition,
    };

    fn billing() -> ProjectPlan {
        let ctx = ProjectContext::builder()
            .id("billing")
            .name("Billing <Portal>")
            .domain("Invoices and payments")
            .module(
                ModuleDefinition::new("Billing")
                    .description("Issue and track invoices")
                    .status("draft")
                    .table(
                        TableDefinition::new("invoice")
                            .column(ColumnDefinition::new("id", "uuid").primary())
                            .column(ColumnDefinition::new("amount", "decimal")),
                    )
                    .api(ApiDescriptor::new("get", "/invoices", "List invoices"))
                    .screen(ScreenDefinition::new("Invoices", "list", "/invoices")),
            )
            .build()
            .unwrap();
        ProjectPlan::build(&ctx)
    }

    fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a GeneratedFile {
        files.iter().find(|f| f.path.as_str() == path).unwrap()
    }

    #[test]
    fn emits_every_config_file_once() {
        let files = ConfigEmitter.emit(&billing());
        assert_eq!(files.len(), 12);
        for f in &files {
            assert_eq!(f.class, ArtifactClass::classify(f.path.as_str()), "{}", f.path);
            assert!(!f.content.contains("{{"), "unrendered placeholder in {}", f.path);
        }
    }

    #[test]
    fn readme_lists_modules_and_endpoints() {
        let readme = render_readme(&billing());
        assert!(readme.starts_with("# Billing <Portal>\n"));
        assert!(readme.contains("### Billing"));
        assert!(readme.contains("Issue and track invoices"));
        assert!(readme.contains("Status: draft"));
        assert!(readme.contains("- Invoices (list, `/invoices`, table `invoice`)"));
        assert!(readme.contains("- `GET /invoices`: List invoices"));
        assert!(readme.contains("| GET | `/api/billing/invoice/:id` | get invoice |"));
        assert!(readme.contains("| POST | `/api/billing/invoice` | create invoice |"));
        assert!(readme.contains("npx prisma migrate dev --name init"));
    }

    #[test]
    fn manifest_is_valid_json() {
        let json: serde_json::Value = serde_json::from_str(&render_manifest(&billing())).unwrap();
        assert_eq!(json["projectId"], "billing");
        assert_eq!(json["provider"], "postgresql");
        let table = &json["modules"][0]["tables"][0];
        assert_eq!(table["model"], "Invoice");
        assert_eq!(table["endpoint"], "/api/billing/invoice");
        assert_eq!(table["columns"][1]["storageType"], "Decimal @db.Decimal(12, 2)");
        assert_eq!(
            json["modules"][0]["screens"][0]["page"],
            "frontend/src/pages/BillingInvoices.tsx"
        );
    }

    #[test]
    fn static_files_are_rendered() {
        let files = ConfigEmitter.emit(&billing());
        let env = &file(&files, ".env.example").content;
        assert!(env.contains("DATABASE_URL=\"postgresql://"));
        assert!(env.contains("PORT=3001"));

        let html = &file(&files, "frontend/index.html").content;
        assert!(html.contains("<title>Billing &lt;Portal&gt;</title>"));

        let pkg: serde_json::Value =
            serde_json::from_str(&file(&files, "backend/package.json").content).unwrap();
        assert_eq!(pkg["name"], "billing-portal-backend");
        assert!(pkg["dependencies"]["express"].is_string());

        let vite = &file(&files, "frontend/vite.config.ts").content;
        assert!(vite.contains("'/api': 'http://localhost:3001'"));
    }

    #[test]
    fn empty_project_still_documents_itself() {
        let ctx = ProjectContext::builder().id("empty").build().unwrap();
        let readme = render_readme(&ProjectPlan::build(&ctx));
        assert!(readme.contains("_No modules declared._"));
        assert!(readme.contains("_No tables declared"));
    }
}
