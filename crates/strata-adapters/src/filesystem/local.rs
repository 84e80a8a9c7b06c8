//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use strata_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{StrataError, StrataResult},
};
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> StrataResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> StrataResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir_all(&self, path: &Path) -> StrataResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn rename(&self, from: &Path, to: &Path) -> StrataResult<()> {
        if to.exists() {
            return Err(ApplicationError::filesystem(to, "destination already exists").into());
        }
        std::fs::rename(from, to).map_err(|e| map_io_error(from, e, "rename"))
    }

    fn read_text(&self, path: &Path) -> StrataResult<Option<String>> {
        let bytes = std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))?;
        Ok(String::from_utf8(bytes).ok())
    }

    fn list_files(
        &self,
        root: &Path,
        skip_dirs: &[String],
        max_depth: usize,
    ) -> StrataResult<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| {
                !(entry.depth() > 0
                    && entry.file_type().is_dir()
                    && skip_dirs
                        .iter()
                        .any(|skip| entry.file_name().to_string_lossy() == skip.as_str()))
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                StrataError::from(ApplicationError::filesystem(path, e))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StrataError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn skip() -> Vec<String> {
        vec!["node_modules".to_string()]
    }

    #[test]
    fn writes_and_reads_back() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let dir = tmp.path().join("a/b");
        fs.create_dir_all(&dir).unwrap();
        fs.create_dir_all(&dir).unwrap();
        fs.write_file(&dir.join("x.txt"), "hello").unwrap();

        assert!(fs.exists(&dir.join("x.txt")));
        assert_eq!(
            fs.read_text(&dir.join("x.txt")).unwrap().as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn binary_files_read_as_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("logo.png");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert_eq!(LocalFilesystem.read_text(&path).unwrap(), None);
    }

    #[test]
    fn listing_skips_dirs_and_respects_depth() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let fs = LocalFilesystem::new();
        for dir in ["src", "node_modules/pkg", "a/b/c"] {
            fs.create_dir_all(&root.join(dir)).unwrap();
        }
        fs.write_file(&root.join("README.md"), "").unwrap();
        fs.write_file(&root.join("src/main.ts"), "").unwrap();
        fs.write_file(&root.join("node_modules/pkg/index.js"), "").unwrap();
        fs.write_file(&root.join("a/b/c/deep.txt"), "").unwrap();

        let mut files = fs.list_files(root, &skip(), 3).unwrap();
        files.sort();
        assert_eq!(files, vec![root.join("README.md"), root.join("src/main.ts")]);
    }

    #[test]
    fn rename_refuses_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let from = tmp.path().join("from");
        let to = tmp.path().join("to");
        fs.create_dir_all(&from).unwrap();
        fs.create_dir_all(&to).unwrap();
        assert!(fs.rename(&from, &to).is_err());

        fs.remove_dir_all(&to).unwrap();
        fs.rename(&from, &to).unwrap();
        assert!(to.exists() && !from.exists());
    }

    #[test]
    fn errors_carry_the_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing/file.txt");
        let err = LocalFilesystem.write_file(&missing, "x").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
