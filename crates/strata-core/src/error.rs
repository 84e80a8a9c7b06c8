//! Unified error handling for Strata Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Strata Core operations.
#[derive(Debug, Error, Clone)]
pub enum StrataError {
    /// The project model was rejected before anything was generated.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Reading or writing the project tree failed.
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StrataError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run `strata config list` to see the effective settings".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Strata".into(),
                "Please report this issue at: https://github.com/strata-dev/strata/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Model => ErrorCategory::Model,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::LockPoisoned)
                | Self::Application(ApplicationError::MaterializationFailed { .. })
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad identifiers or arguments.
    Validation,
    /// A well-formed model that cannot be generated consistently.
    Model,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StrataResult<T> = Result<T, StrataError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> StrataResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> StrataResult<T> {
        self.map_err(|e| StrataError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn domain_categories_carry_through() {
        let err: StrataError = DomainError::DuplicateColumn {
            table: "t".into(),
            column: "c".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Model);
        assert!(!err.suggestions().is_empty());
        assert!(!err.is_retryable());
    }

    #[test]
    fn write_failures_are_retryable() {
        let err: StrataError = ApplicationError::MaterializationFailed {
            project_dir: PathBuf::from("out/p"),
            written: 3,
            total: 10,
            path: PathBuf::from("out/p/README.md"),
            reason: "disk full".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("3 of 10"));
    }

    #[test]
    fn context_wraps_as_internal() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let err = res.context("reading model").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().contains("reading model: boom"));
    }
}
