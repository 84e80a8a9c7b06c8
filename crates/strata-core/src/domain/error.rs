// ============================================================================
// domain/error.rs - MODEL VALIDATION ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (returned from pure validation, no I/O state attached)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Project identity
    // ========================================================================
    #[error("Invalid project id '{id}': {reason}")]
    InvalidProjectId { id: String, reason: String },

    // ========================================================================
    // Model shape (precondition violations)
    // ========================================================================
    #[error("Module '{module}' is declared more than once (as '{key}')")]
    DuplicateModule { module: String, key: String },

    #[error("Table '{table}' in module '{module}' collides with another table named '{key}'")]
    DuplicateTable {
        module: String,
        table: String,
        key: String,
    },

    #[error("Column '{column}' is declared more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Table '{table}' marks more than one primary key: {columns:?}")]
    MultiplePrimaryKeys { table: String, columns: Vec<String> },

    #[error("Column '{column}' in table '{table}' collides with the audit column '{reserved}'")]
    ReservedColumn {
        table: String,
        column: String,
        reserved: &'static str,
    },

    // ========================================================================
    // Generated output
    // ========================================================================
    #[error("Duplicate path in generated output: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Unknown artifact class: {0}")]
    UnknownArtifactClass(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidProjectId { id, reason } => vec![
                format!("Project id '{}' cannot be used as a directory name: {}", id, reason),
                "Use letters, digits, hyphens and underscores only".into(),
                "Example: \"projectId\": \"billing-portal\"".into(),
            ],
            Self::DuplicateModule { module, .. } => vec![
                format!("Rename or merge the second '{}' module", module),
                "Module names are compared after case normalization".into(),
            ],
            Self::DuplicateTable { table, .. } => vec![
                format!("Table '{}' would produce the same schema model twice", table),
                "Tables share one schema across all modules; give each a unique name".into(),
            ],
            Self::DuplicateColumn { table, column } => vec![
                format!("Remove or rename one of the '{}' columns in '{}'", column, table),
                "Names like 'unit_price' and 'unitPrice' are the same column".into(),
            ],
            Self::MultiplePrimaryKeys { table, .. } => vec![
                format!("Keep a single \"primaryKey\": true column in '{}'", table),
                "Composite keys are not supported".into(),
            ],
            Self::ReservedColumn { reserved, .. } => vec![
                format!("'{}' is added to every table automatically", reserved),
                "Drop the column from the model".into(),
            ],
            Self::DuplicatePath { path } => vec![
                format!("Two artifacts would be written to '{}'", path),
                "Check for screens with names that normalize to the same identifier".into(),
            ],
            Self::UnknownArtifactClass(_) => vec![
                "Valid classes: persistence, service, presentation, config".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidProjectId { .. }
            | Self::MissingRequiredField { .. }
            | Self::UnknownArtifactClass(_) => ErrorCategory::Validation,
            Self::DuplicateModule { .. }
            | Self::DuplicateTable { .. }
            | Self::DuplicateColumn { .. }
            | Self::MultiplePrimaryKeys { .. }
            | Self::ReservedColumn { .. } => ErrorCategory::Model,
            Self::DuplicatePath { .. } | Self::AbsolutePathNotAllowed { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Model,
    Internal,
}
