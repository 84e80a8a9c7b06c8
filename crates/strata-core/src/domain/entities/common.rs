use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A project-relative artifact path, always stored with `/` separators.
///
/// Invariant: never absolute. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    /// Create a new relative path.
    ///
    /// # Panics
    /// Panics if path is absolute (use `try_new` for fallible).
    pub fn new(path: impl Into<String>) -> Self {
        match Self::try_new(path) {
            Ok(path) => path,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible constructor. Backslashes are normalized to `/`.
    pub fn try_new(path: impl Into<String>) -> Result<Self, DomainError> {
        let normalized = path.into().replace('\\', "/");
        if normalized.starts_with('/') || Path::new(&normalized).is_absolute() {
            return Err(DomainError::AbsolutePathNotAllowed { path: normalized });
        }
        Ok(Self(normalized))
    }

    /// Build from a filesystem path relative to some root.
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        Self::try_new(path.to_string_lossy().into_owned())
    }

    /// Join a segment, maintaining relative invariant.
    pub fn join(&self, segment: &str) -> Result<Self, DomainError> {
        if segment.starts_with('/') {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: segment.to_string(),
            });
        }
        if self.0.is_empty() {
            return Self::try_new(segment);
        }
        Self::try_new(format!("{}/{}", self.0.trim_end_matches('/'), segment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.0.split('/').collect()
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<RelativePath> for String {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
