//! Reads a [`ProjectContext`] from a JSON or TOML document.
//!
//! Both formats use the same camelCase keys:
//!
//! ```toml
//! projectId = "billing"
//! database  = "postgres"
//!
//! [[modules]]
//! name = "Billing"
//!
//! [[modules.tables]]
//! name = "invoice"
//! columns = [
//!   { name = "id", type = "uuid", primaryKey = true },
//!   { name = "amount", type = "decimal" },
//! ]
//!
//! [[modules.screens]]
//! name  = "Invoices"
//! kind  = "list"
//! route = "/invoices"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use strata_core::{application::ApplicationError, domain::ProjectContext, error::StrataResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFormat {
    Json,
    Toml,
}

impl ContextFormat {
    /// Infer from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextLoader;

impl ContextLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a model file; the format follows the extension.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> StrataResult<ProjectContext> {
        let format = ContextFormat::from_path(path).ok_or_else(|| {
            ApplicationError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
        })?;

        let text = fs::read_to_string(path).map_err(|e| ApplicationError::ContextLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let context = self.parse(&text, format, path)?;
        debug!(
            project = %context.project_id,
            modules = context.modules.len(),
            "Loaded project model"
        );
        Ok(context)
    }

    /// Parse an in-memory document. `origin` only labels errors.
    pub fn parse(
        &self,
        text: &str,
        format: ContextFormat,
        origin: &Path,
    ) -> StrataResult<ProjectContext> {
        let parsed: Result<ProjectContext, String> = match format {
            ContextFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            ContextFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        };

        parsed.map_err(|reason| {
            ApplicationError::ContextLoad {
                path: PathBuf::from(origin),
                reason,
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::domain::{DatabaseEngine, ScreenKind};
    use strata_core::error::StrataError;
    use tempfile::TempDir;

    const JSON: &str = r#"{
        "projectId": "billing",
        "projectName": "Billing",
        "modules": [{
            "name": "Billing",
            "tables": [{
                "name": "invoice",
                "columns": [
                    { "name": "id", "type": "uuid", "primaryKey": true },
                    { "name": "amount", "type": "decimal" }
                ]
            }],
            "screens": [{ "name": "Invoices", "kind": "list", "route": "/invoices" }]
        }]
    }"#;

    const TOML: &str = r#"
projectId = "billing"
database = "sqlite"

[[modules]]
name = "Billing"

[[modules.tables]]
name = "invoice"
columns = [
  { name = "id", type = "uuid", primaryKey = true },
  { name = "amount", type = "decimal" },
]

[[modules.screens]]
name = "New invoice"
kind = "form"
route = "invoices/new/"
"#;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ContextFormat::from_path(Path::new("a/model.JSON")),
            Some(ContextFormat::Json)
        );
        assert_eq!(
            ContextFormat::from_path(Path::new("model.toml")),
            Some(ContextFormat::Toml)
        );
        assert_eq!(ContextFormat::from_path(Path::new("model.yaml")), None);
    }

    #[test]
    fn loads_json_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("model.json");
        fs::write(&path, JSON).unwrap();

        let ctx = ContextLoader::new().load(&path).unwrap();
        assert_eq!(ctx.project_id, "billing");
        assert_eq!(ctx.database, DatabaseEngine::Postgres);
        assert!(ctx.modules[0].tables[0].columns[0].primary_key);
    }

    #[test]
    fn parses_toml_with_the_same_keys() {
        let ctx = ContextLoader::new()
            .parse(TOML, ContextFormat::Toml, Path::new("model.toml"))
            .unwrap();
        assert_eq!(ctx.database, DatabaseEngine::Sqlite);
        let screen = &ctx.modules[0].screens[0];
        assert_eq!(screen.kind, ScreenKind::Form);
        assert_eq!(screen.route, "/invoices/new");
    }

    #[test]
    fn malformed_documents_name_the_file() {
        let err = ContextLoader::new()
            .parse("{ nope", ContextFormat::Json, Path::new("bad.json"))
            .unwrap_err();
        assert!(matches!(
            err,
            StrataError::Application(ApplicationError::ContextLoad { .. })
        ));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = ContextLoader::new()
            .load(Path::new("model.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            StrataError::Application(ApplicationError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let tmp = TempDir::new().unwrap();
        let err = ContextLoader::new()
            .load(&tmp.path().join("absent.json"))
            .unwrap_err();
        assert!(matches!(
            err,
            StrataError::Application(ApplicationError::ContextLoad { .. })
        ));
    }
}
