use super::{DomainError, RelativePath};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// ArtifactClass
// ============================================================================

/// Which layer a file belongs to. Derived from the path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactClass {
    Persistence,
    Service,
    Presentation,
    Config,
}

/// File names that are config wherever they live.
const MANIFEST_NAMES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "tsconfig.json",
    "tsconfig.node.json",
    "vite.config.ts",
    "project.json",
    ".env",
    ".env.example",
    ".gitignore",
];

impl ArtifactClass {
    pub const ALL: [Self; 4] = [
        Self::Persistence,
        Self::Service,
        Self::Presentation,
        Self::Config,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Persistence => "persistence",
            Self::Service => "service",
            Self::Presentation => "presentation",
            Self::Config => "config",
        }
    }

    /// Classify a project-relative path.
    ///
    /// Rules are checked in order: manifests and docs, then persistence
    /// markers, then the `backend/` and `frontend/` trees.
    pub fn classify(path: &str) -> Self {
        let path = path.replace('\\', "/");
        let path = path.trim_start_matches("./");
        let file_name = path.rsplit('/').next().unwrap_or(path);

        if MANIFEST_NAMES.contains(&file_name) || file_name.ends_with(".md") {
            return Self::Config;
        }

        let rooted = format!("/{path}");
        if rooted.contains("/prisma/")
            || rooted.contains("/db/")
            || file_name.ends_with(".prisma")
            || file_name.ends_with(".sql")
        {
            return Self::Persistence;
        }

        if path.starts_with("backend/") {
            Self::Service
        } else if path.starts_with("frontend/") {
            Self::Presentation
        } else {
            Self::Config
        }
    }
}

impl fmt::Display for ArtifactClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "persistence" | "schema" | "db" => Ok(Self::Persistence),
            "service" | "backend" | "api" => Ok(Self::Service),
            "presentation" | "frontend" | "ui" => Ok(Self::Presentation),
            "config" => Ok(Self::Config),
            other => Err(DomainError::UnknownArtifactClass(other.to_string())),
        }
    }
}

// ============================================================================
// GeneratedFile
// ============================================================================

/// One emitted artifact. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: RelativePath,
    pub content: String,
    pub class: ArtifactClass,
}

impl GeneratedFile {
    /// Build a file whose class is derived from its path.
    pub fn new(path: impl Into<RelativePath>, content: impl Into<String>) -> Self {
        let path = path.into();
        let class = ArtifactClass::classify(path.as_str());
        Self {
            path,
            content: content.into(),
            class,
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// A non-fatal note about how the model was interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted model path, e.g. `Billing.invoice.amount`.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn info(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

// ============================================================================
// MaterializedProject
// ============================================================================

/// Shell commands for the emitted Express + Prisma + React stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCommands {
    pub install: String,
    pub migrate: String,
    pub start: String,
}

impl Default for RunCommands {
    fn default() -> Self {
        Self {
            install: "cd backend && npm install && cd ../frontend && npm install".into(),
            migrate: "cd backend && npx prisma migrate dev --name init".into(),
            start: "cd backend && npm run dev & cd frontend && npm run dev".into(),
        }
    }
}

/// Result of one materialization pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterializedProject {
    pub project_dir: PathBuf,
    pub files: Vec<GeneratedFile>,
    pub commands: RunCommands,
    pub diagnostics: Vec<Diagnostic>,
}

impl MaterializedProject {
    pub fn files_of(&self, class: ArtifactClass) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(move |f| f.class == class)
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(GeneratedFile::size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_path() {
        use ArtifactClass::*;
        let cases = [
            ("backend/prisma/schema.prisma", Persistence),
            ("backend/src/db/client.ts", Persistence),
            ("migrations/001_init.sql", Persistence),
            ("backend/src/routes/billing.ts", Service),
            ("backend/src/index.ts", Service),
            ("frontend/src/pages/BillingInvoices.tsx", Presentation),
            ("frontend/index.html", Presentation),
            ("backend/package.json", Config),
            ("frontend/vite.config.ts", Config),
            ("README.md", Config),
            ("docs/notes.md", Config),
            (".env.example", Config),
            ("project.json", Config),
            ("scripts/seed.sh", Config),
        ];
        for (path, expected) in cases {
            assert_eq!(ArtifactClass::classify(path), expected, "{path}");
        }
    }

    #[test]
    fn classify_ignores_platform_separators() {
        assert_eq!(
            ArtifactClass::classify("backend\\src\\routes\\a.ts"),
            ArtifactClass::Service
        );
    }

    #[test]
    fn class_parses_aliases() {
        assert_eq!("UI".parse::<ArtifactClass>().unwrap(), ArtifactClass::Presentation);
        assert_eq!("schema".parse::<ArtifactClass>().unwrap(), ArtifactClass::Persistence);
        assert!("binary".parse::<ArtifactClass>().is_err());
    }

    #[test]
    fn new_file_derives_class() {
        let file = GeneratedFile::new("backend/src/http.ts", "export {};\n");
        assert_eq!(file.class, ArtifactClass::Service);
        assert_eq!(file.size(), 11);
    }

    #[test]
    fn class_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ArtifactClass::Presentation).unwrap(),
            "\"presentation\""
        );
    }
}
