//! Presentation layer: one React page per screen plus the app shell.
//!
//! Page kinds:
//! - **list** fetches `<module>/<table>` on mount and tabulates up to five
//!   data columns with view/delete actions
//! - **form** posts to the same endpoint, then navigates to the list route
//! - **detail** (and unknown kinds) loads one record by path parameter
//!
//! A module without tables still gets one placeholder page per screen.

use super::{
    Emitter,
    plan::{AUDIT, ColumnPlan, ModulePlan, ProjectPlan, ScreenPlan, TablePlan},
    source::{SourceBuilder, ts_string},
};
use crate::domain::{
    entities::GeneratedFile,
    types::{DisplayType, TransportType},
    value_objects::ScreenKind,
};

pub const APP_PATH: &str = "frontend/src/App.tsx";
pub const MAIN_PATH: &str = "frontend/src/main.tsx";
pub const API_PATH: &str = "frontend/src/api.ts";
pub const LAYOUT_PATH: &str = "frontend/src/components/Layout.tsx";

/// Columns shown by a list page, key and audit excluded.
pub const LIST_COLUMNS: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenEmitter;

impl Emitter for ScreenEmitter {
    fn name(&self) -> &'static str {
        "screens"
    }

    fn emit(&self, plan: &ProjectPlan) -> Vec<GeneratedFile> {
        let mut files: Vec<GeneratedFile> = plan
            .screens()
            .map(|(module, screen)| self.emit_screen(module, screen))
            .collect();

        files.push(GeneratedFile::new(APP_PATH, render_app(plan)));
        files.push(GeneratedFile::new(MAIN_PATH, MAIN_TSX));
        files.push(GeneratedFile::new(API_PATH, API_TS));
        files.push(GeneratedFile::new(LAYOUT_PATH, render_layout(plan)));
        files
    }
}

impl ScreenEmitter {
    /// Exactly one page for one screen.
    pub fn emit_screen(&self, module: &ModulePlan, screen: &ScreenPlan) -> GeneratedFile {
        let component = module.page_component(screen);
        let content = match module.source_of(screen) {
            None => render_placeholder(&component, module, screen),
            Some(table) => match &screen.kind {
                ScreenKind::List => render_list(&component, module, screen, table),
                ScreenKind::Form => render_form(&component, module, screen, table),
                ScreenKind::Detail | ScreenKind::Other(_) => {
                    render_detail(&component, module, screen, table)
                }
            },
        };
        GeneratedFile::new(page_path(&component).as_str(), content)
    }
}

pub fn page_path(component: &str) -> String {
    format!("frontend/src/pages/{component}.tsx")
}

/// Endpoint path handed to `apiUrl`, `<module kebab>/<table kebab>`.
pub fn fetch_target(module: &ModulePlan, table: &TablePlan) -> String {
    format!("{}/{}", module.segment(), table.segment())
}

// ============================================================================
// Route arithmetic
// ============================================================================

fn is_param(segment: &str) -> bool {
    segment.len() > 1 && segment.starts_with(':')
}

/// Name of the last `:param` segment.
pub fn last_param(route: &str) -> Option<&str> {
    route
        .split('/')
        .rev()
        .find(|s| is_param(s))
        .map(|s| &s[1..])
}

/// `/invoices/new` → `/invoices`; unchanged without the suffix.
pub fn strip_new_suffix(route: &str) -> String {
    match route.strip_suffix("/new") {
        Some("") => "/".to_string(),
        Some(rest) => rest.to_string(),
        None => route.to_string(),
    }
}

/// The route up to its first `:param` segment, so `/invoices/:id/edit`
/// becomes `/invoices`. Unchanged when no segment is a parameter.
pub fn strip_param_segments(route: &str) -> String {
    let segments: Vec<&str> = route.split('/').collect();
    match segments.iter().position(|s| is_param(s)) {
        Some(first) => {
            let head = segments[..first].join("/");
            if head.is_empty() { "/".to_string() } else { head }
        }
        None => route.to_string(),
    }
}

fn join_route(route: &str, segment: &str) -> String {
    if route == "/" {
        format!("/{segment}")
    } else {
        format!("{route}/{segment}")
    }
}

/// Route registered in `App.tsx`. Record views without a parameter get
/// `/:<key>` appended.
pub fn shell_route(module: &ModulePlan, screen: &ScreenPlan) -> String {
    match module.source_of(screen) {
        Some(table) if screen.kind.is_record_view() && last_param(&screen.route).is_none() => {
            join_route(&screen.route, &format!(":{}", table.key().field()))
        }
        _ => screen.route.clone(),
    }
}

/// Path parameter a record view reads its key from.
fn record_param(screen: &ScreenPlan, table: &TablePlan) -> String {
    last_param(&screen.route)
        .map(str::to_string)
        .unwrap_or_else(|| table.key().field())
}

/// Split a record route at its last parameter: `/a/:id/edit` → (`/a/`, `/edit`).
fn record_link_parts(route: &str) -> (String, String) {
    let segments: Vec<&str> = route.split('/').collect();
    match segments.iter().rposition(|s| is_param(s)) {
        Some(i) => {
            let prefix = format!("{}/", segments[..i].join("/"));
            let suffix = segments[i + 1..]
                .iter()
                .map(|s| format!("/{s}"))
                .collect::<String>();
            (prefix, suffix)
        }
        None => (join_route(route, ""), String::new()),
    }
}

/// Shell route of the first record view bound to `table` in this module.
fn detail_route_for(module: &ModulePlan, table: &TablePlan) -> Option<String> {
    module
        .screens
        .iter()
        .filter(|s| s.kind.is_record_view())
        .find(|s| module.source_of(s).is_some_and(|t| t.ident == table.ident))
        .map(|s| shell_route(module, s))
}

// ============================================================================
// Shared page fragments
// ============================================================================

fn transport_ts(column: &ColumnPlan) -> String {
    let base = match column.mapping().transport {
        TransportType::String => "string",
        TransportType::Number => "number",
        TransportType::Boolean => "boolean",
        TransportType::Unknown => "unknown",
    };
    if column.nullable && column.mapping().transport != TransportType::Unknown {
        format!("{base} | null")
    } else {
        base.to_string()
    }
}

fn render_row_type(out: &mut SourceBuilder, table: &TablePlan) {
    out.open("type Row = {");
    for column in &table.columns {
        out.line(format!("{}: {};", column.field(), transport_ts(column)));
    }
    for audit in &AUDIT {
        out.line(format!("{}: string;", audit.field));
    }
    out.close("};");
}

fn render_fetch_json(out: &mut SourceBuilder, target: &str, setter: &str, ty: &str) {
    out.line(format!("fetch(apiUrl({target}))"));
    out.open("  .then((res) => {");
    out.line("  if (!res.ok) {");
    out.line("    throw new Error(`Request failed with status ${res.status}`);");
    out.line("  }");
    out.line(format!("  return res.json() as Promise<{ty}>;"));
    out.close("  })");
    out.line(format!("  .then({setter})"));
    out.line("  .catch((err: Error) => setError(err.message));");
}

fn error_banner(out: &mut SourceBuilder) {
    out.line("{error && <p className=\"error\">{error}</p>}");
}

// ============================================================================
// Pages
// ============================================================================

fn render_list(
    component: &str,
    module: &ModulePlan,
    screen: &ScreenPlan,
    table: &TablePlan,
) -> String {
    let target = fetch_target(module, table);
    let key = table.key().field();
    let columns: Vec<&ColumnPlan> = table.data_columns().take(LIST_COLUMNS).collect();
    let detail = detail_route_for(module, table);

    let mut out = SourceBuilder::new();
    out.line("import { useEffect, useState } from 'react';");
    if detail.is_some() {
        out.line("import { Link } from 'react-router-dom';");
    }
    out.line("import { apiUrl, formatValue } from '../api';");
    out.blank();
    render_row_type(&mut out, table);
    out.blank();
    out.open(format!("export default function {component}() {{"));
    out.line("const [rows, setRows] = useState<Row[]>([]);");
    out.line("const [error, setError] = useState<string | null>(null);");
    out.blank();
    out.open("useEffect(() => {");
    render_fetch_json(&mut out, &ts_string(&target), "setRows", "Row[]");
    out.close("}, []);");
    out.blank();
    out.open("async function remove(key: string) {");
    out.open("try {");
    out.line(format!(
        "const res = await fetch(apiUrl({} + encodeURIComponent(key)), {{ method: 'DELETE' }});",
        ts_string(&format!("{target}/"))
    ));
    out.open("if (res.ok) {");
    out.line(format!(
        "setRows((current) => current.filter((row) => String(row.{key}) !== key));"
    ));
    out.reopen("} else {");
    out.line("setError(`Delete failed with status ${res.status}`);");
    out.close("}");
    out.reopen("} catch (err) {");
    out.line("setError(String(err));");
    out.close("}");
    out.close("}");
    out.blank();
    out.open("return (");
    out.open("<section>");
    out.line(format!("<h1>{}</h1>", screen.ident.title()));
    error_banner(&mut out);
    out.open("<table>");
    out.open("<thead>");
    out.open("<tr>");
    for column in &columns {
        out.line(format!("<th>{}</th>", column.label()));
    }
    out.line("<th>Actions</th>");
    out.close("</tr>");
    out.close("</thead>");
    out.open("<tbody>");
    out.open("{rows.map((row) => (");
    out.open(format!("<tr key={{String(row.{key})}}>"));
    for column in &columns {
        out.line(format!("<td>{{formatValue(row.{})}}</td>", column.field()));
    }
    out.open("<td>");
    if let Some(route) = &detail {
        let (prefix, suffix) = record_link_parts(route);
        let suffix = if suffix.is_empty() {
            String::new()
        } else {
            format!(" + {}", ts_string(&suffix))
        };
        out.line(format!(
            "<Link to={{{} + encodeURIComponent(String(row.{key})){suffix}}}>View</Link>{{' '}}",
            ts_string(&prefix)
        ));
    }
    out.line(format!(
        "<button type=\"button\" onClick={{() => remove(String(row.{key}))}}>"
    ));
    out.line("  Delete");
    out.line("</button>");
    out.close("</td>");
    out.close("</tr>");
    out.close("))}");
    out.close("</tbody>");
    out.close("</table>");
    out.close("</section>");
    out.close(");");
    out.close("}");
    out.finish()
}

fn initial_value(column: &ColumnPlan) -> &'static str {
    if column.mapping().display == DisplayType::Checkbox {
        "false"
    } else {
        "''"
    }
}

fn render_input(out: &mut SourceBuilder, column: &ColumnPlan) {
    let field = column.field();
    let required = if column.nullable { "" } else { " required" };
    out.open("<label>");
    out.line(column.label());
    match column.mapping().display {
        DisplayType::Checkbox => out.line(format!(
            "<input type=\"checkbox\" checked={{Boolean(values.{field})}} onChange={{(e) => update('{field}', e.target.checked)}} />"
        )),
        DisplayType::TextArea => out.line(format!(
            "<textarea value={{String(values.{field})}} onChange={{(e) => update('{field}', e.target.value)}}{required} />"
        )),
        DisplayType::Number => out.line(format!(
            "<input type=\"number\" step=\"any\" value={{String(values.{field})}} onChange={{(e) => update('{field}', e.target.value)}}{required} />"
        )),
        display => out.line(format!(
            "<input type=\"{}\" value={{String(values.{field})}} onChange={{(e) => update('{field}', e.target.value)}}{required} />",
            display.as_str()
        )),
    };
    out.close("</label>");
}

fn render_form(
    component: &str,
    module: &ModulePlan,
    screen: &ScreenPlan,
    table: &TablePlan,
) -> String {
    let target = fetch_target(module, table);
    let after_save = strip_new_suffix(&screen.route);
    // A key without a default has to come from the user.
    let inputs: Vec<&ColumnPlan> = table
        .columns
        .iter()
        .filter(|c| !c.is_key || table.key_default.is_none())
        .collect();

    let initial: Vec<String> = inputs
        .iter()
        .map(|c| format!("{}: {}", c.field(), initial_value(c)))
        .collect();

    let mut out = SourceBuilder::new();
    out.line("import { type FormEvent, useState } from 'react';");
    out.line("import { useNavigate } from 'react-router-dom';");
    out.line("import { apiUrl } from '../api';");
    out.blank();
    out.line("type Values = Record<string, string | boolean>;");
    out.blank();
    out.open(format!("export default function {component}() {{"));
    out.line("const navigate = useNavigate();");
    out.line(format!(
        "const [values, setValues] = useState<Values>({{ {} }});",
        initial.join(", ")
    ));
    out.line("const [error, setError] = useState<string | null>(null);");
    out.line("const [saving, setSaving] = useState(false);");
    out.blank();
    out.open("function update(field: string, value: string | boolean) {");
    out.line("setValues((current) => ({ ...current, [field]: value }));");
    out.close("}");
    out.blank();
    out.open("async function submit(event: FormEvent) {");
    out.line("event.preventDefault();");
    out.line("setSaving(true);");
    out.line("setError(null);");
    out.open("try {");
    out.open(format!(
        "const res = await fetch(apiUrl({}), {{",
        ts_string(&target)
    ));
    out.line("method: 'POST',");
    out.line("headers: { 'Content-Type': 'application/json' },");
    out.line("body: JSON.stringify(values),");
    out.close("});");
    out.open("if (!res.ok) {");
    out.line("setError(`Save failed with status ${res.status}`);");
    out.line("return;");
    out.close("}");
    out.line(format!("navigate({});", ts_string(&after_save)));
    out.reopen("} catch (err) {");
    out.line("setError(String(err));");
    out.reopen("} finally {");
    out.line("setSaving(false);");
    out.close("}");
    out.close("}");
    out.blank();
    out.open("return (");
    out.open("<section>");
    out.line(format!("<h1>{}</h1>", screen.ident.title()));
    error_banner(&mut out);
    out.open("<form onSubmit={submit}>");
    for column in &inputs {
        render_input(&mut out, column);
    }
    out.line("<button type=\"submit\" disabled={saving}>");
    out.line("  Save");
    out.line("</button>");
    out.close("</form>");
    out.close("</section>");
    out.close(");");
    out.close("}");
    out.finish()
}

fn render_detail(
    component: &str,
    module: &ModulePlan,
    screen: &ScreenPlan,
    table: &TablePlan,
) -> String {
    let target = fetch_target(module, table);
    let param = record_param(screen, table);
    let back = strip_param_segments(&screen.route);

    let mut out = SourceBuilder::new();
    out.line("import { useEffect, useState } from 'react';");
    out.line("import { Link, useParams } from 'react-router-dom';");
    out.line("import { apiUrl, formatValue } from '../api';");
    out.blank();
    render_row_type(&mut out, table);
    out.blank();
    out.open(format!("export default function {component}() {{"));
    out.line("const params = useParams();");
    out.line(format!("const key = params[{}];", ts_string(&param)));
    out.line("const [row, setRow] = useState<Row | null>(null);");
    out.line("const [error, setError] = useState<string | null>(null);");
    out.blank();
    out.open("useEffect(() => {");
    out.open("if (!key) {");
    out.line("return;");
    out.close("}");
    out.line(format!(
        "fetch(apiUrl({} + encodeURIComponent(key)))",
        ts_string(&format!("{target}/"))
    ));
    out.open("  .then((res) => {");
    out.line("  if (!res.ok) {");
    out.line("    throw new Error(res.status === 404 ? 'Record not found' : `Request failed with status ${res.status}`);");
    out.line("  }");
    out.line("  return res.json() as Promise<Row>;");
    out.close("  })");
    out.line("  .then(setRow)");
    out.line("  .catch((err: Error) => setError(err.message));");
    out.close("}, [key]);");
    out.blank();
    out.open("return (");
    out.open("<section>");
    out.line(format!("<h1>{}</h1>", screen.ident.title()));
    error_banner(&mut out);
    out.open("{row && (");
    out.open("<dl>");
    for column in &table.columns {
        out.line(format!("<dt>{}</dt>", column.label()));
        out.line(format!("<dd>{{formatValue(row.{})}}</dd>", column.field()));
    }
    for audit in &AUDIT {
        out.line(format!("<dt>{}</dt>", audit.label));
        out.line(format!("<dd>{{formatValue(row.{})}}</dd>", audit.field));
    }
    out.close("</dl>");
    out.close(")}");
    out.line(format!("<Link to={{{}}}>Back</Link>", ts_string(&back)));
    out.close("</section>");
    out.close(");");
    out.close("}");
    out.finish()
}

fn render_placeholder(component: &str, module: &ModulePlan, screen: &ScreenPlan) -> String {
    let mut out = SourceBuilder::new();
    out.open(format!("export default function {component}() {{"));
    out.open("return (");
    out.open("<section>");
    out.line(format!("<h1>{}</h1>", screen.ident.title()));
    out.line(format!(
        "<p>The {} module has no tables yet. Add a table to generate this screen.</p>",
        module.ident.title()
    ));
    out.close("</section>");
    out.close(");");
    out.close("}");
    out.finish()
}

// ============================================================================
// App shell
// ============================================================================

/// Screens reachable without a parameter, in declaration order.
fn nav_entries(plan: &ProjectPlan) -> Vec<(String, String)> {
    plan.screens()
        .map(|(module, screen)| (shell_route(module, screen), screen.ident.title()))
        .filter(|(route, _)| last_param(route).is_none())
        .collect()
}

pub fn render_app(plan: &ProjectPlan) -> String {
    let nav = nav_entries(plan);
    let has_root = plan
        .screens()
        .any(|(module, screen)| shell_route(module, screen) == "/");
    let redirect = (!has_root).then(|| nav.first().map(|(route, _)| route.clone())).flatten();

    let mut out = SourceBuilder::new();
    if redirect.is_some() {
        out.line("import { BrowserRouter, Navigate, Route, Routes } from 'react-router-dom';");
    } else {
        out.line("import { BrowserRouter, Route, Routes } from 'react-router-dom';");
    }
    out.line("import Layout from './components/Layout';");
    for (module, screen) in plan.screens() {
        let component = module.page_component(screen);
        out.line(format!("import {component} from './pages/{component}';"));
    }
    out.blank();
    out.open("export default function App() {");
    out.open("return (");
    out.open("<BrowserRouter>");
    out.open("<Routes>");
    out.open("<Route element={<Layout />}>");
    if let Some(route) = &redirect {
        out.line(format!(
            "<Route path=\"/\" element={{<Navigate to={{{}}} replace />}} />",
            ts_string(route)
        ));
    }
    for (module, screen) in plan.screens() {
        out.line(format!(
            "<Route path={{{}}} element={{<{} />}} />",
            ts_string(&shell_route(module, screen)),
            module.page_component(screen)
        ));
    }
    out.line("<Route path=\"*\" element={<p>Page not found</p>} />");
    out.close("</Route>");
    out.close("</Routes>");
    out.close("</BrowserRouter>");
    out.close(");");
    out.close("}");
    out.finish()
}

pub fn render_layout(plan: &ProjectPlan) -> String {
    let mut out = SourceBuilder::new();
    out.line("import { NavLink, Outlet } from 'react-router-dom';");
    out.blank();
    out.open("const links = [");
    for (route, label) in nav_entries(plan) {
        out.line(format!(
            "{{ to: {}, label: {} }},",
            ts_string(&route),
            ts_string(&label)
        ));
    }
    out.close("];");
    out.blank();
    out.open("export default function Layout() {");
    out.open("return (");
    out.open("<div className=\"app\">");
    out.open("<header>");
    out.line(format!("<strong>{{{}}}</strong>", ts_string(&plan.project_name)));
    out.open("<nav>");
    out.open("{links.map((link) => (");
    out.line("<NavLink key={link.to} to={link.to}>");
    out.line("  {link.label}");
    out.line("</NavLink>");
    out.close("))}");
    out.close("</nav>");
    out.close("</header>");
    out.open("<main>");
    out.line("<Outlet />");
    out.close("</main>");
    out.close("</div>");
    out.close(");");
    out.close("}");
    out.finish()
}

const MAIN_TSX: &str = r#"import { StrictMode } from 'react';
import { createRoot } from 'react-dom/client';
import App from './App';

const container = document.getElementById('root');

if (container) {
  createRoot(container).render(
    <StrictMode>
      <App />
    </StrictMode>,
  );
}
"#;

const API_TS: &str = r#"const API_BASE: string = import.meta.env.VITE_API_URL ?? '/api';

/** Absolute URL of a `<module>/<table>` endpoint path. */
export function apiUrl(path: string): string {
  return `${API_BASE.replace(/\/+$/, '')}/${path.replace(/^\/+/, '')}`;
}

export function formatValue(value: unknown): string {
  if (value === null || value === undefined) {
    return '';
  }
  if (typeof value === 'object') {
    return JSON.stringify(value);
  }
  return String(value);
}
"#;
