//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `strata-adapters` crate provides implementations.

use crate::error::StrataResult;
use std::path::{Path, PathBuf};

/// Port for filesystem operations.
///
/// Implemented by:
/// - `strata_adapters::filesystem::LocalFilesystem` (production)
/// - `strata_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Implementations report failures as `ApplicationError::FilesystemError`
/// carrying the offending path.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories. Succeeds if present.
    fn create_dir_all(&self, path: &Path) -> StrataResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> StrataResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> StrataResult<()>;

    /// Move a file or directory. The destination must not exist.
    fn rename(&self, from: &Path, to: &Path) -> StrataResult<()>;

    /// Read a file as UTF-8. `None` when the content is not text.
    fn read_text(&self, path: &Path) -> StrataResult<Option<String>>;

    /// Regular files under `root`, at most `max_depth` levels deep.
    ///
    /// Directories whose name is in `skip_dirs` are not descended into.
    /// Order is unspecified.
    fn list_files(
        &self,
        root: &Path,
        skip_dirs: &[String],
        max_depth: usize,
    ) -> StrataResult<Vec<PathBuf>>;
}
