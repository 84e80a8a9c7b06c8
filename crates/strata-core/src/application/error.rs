//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A write pass stopped early. Files already written stay in place
    /// unless the pass was staged.
    #[error(
        "Materialization of {project_dir} failed after {written} of {total} files at {path}: {reason}"
    )]
    MaterializationFailed {
        project_dir: PathBuf,
        written: usize,
        total: usize,
        path: PathBuf,
        reason: String,
    },

    /// The project model document could not be read or parsed.
    #[error("Could not load project model from {path}: {reason}")]
    ContextLoad { path: PathBuf, reason: String },

    /// Model file extension is neither JSON nor TOML.
    #[error("Unsupported project model format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Shared state behind a mutex was poisoned.
    #[error("Filesystem state lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::MaterializationFailed { written, .. } if *written > 0 => vec![
                "Some files were written before the failure; re-run to complete the tree".into(),
                "Use --atomic to replace the project directory only on success".into(),
            ],
            Self::MaterializationFailed { .. } => vec![
                "Check that the output root is writable".into(),
                "Choose another location with --output".into(),
            ],
            Self::ContextLoad { .. } => vec![
                "Check that the file exists and is valid JSON or TOML".into(),
                "Keys are camelCase: projectId, modules, tables, columns, screens".into(),
            ],
            Self::UnsupportedFormat { .. } => {
                vec!["Use a .json or .toml project model file".into()]
            }
            Self::LockPoisoned => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. }
            | Self::MaterializationFailed { .. }
            | Self::LockPoisoned => ErrorCategory::Internal,
            Self::ContextLoad { .. } => ErrorCategory::NotFound,
            Self::UnsupportedFormat { .. } => ErrorCategory::Validation,
        }
    }
}
