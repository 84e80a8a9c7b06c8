//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use strata_core::{
    application::{ApplicationError, ports::Filesystem},
    error::StrataResult,
};

/// In-memory filesystem for testing.
///
/// Clones share state, so a test can keep one handle while the service
/// under test owns another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
    /// Writes to these paths (or below them) fail.
    failing: Vec<PathBuf>,
    /// Renames whose source path contains one of these fragments fail.
    failing_renames: Vec<String>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path)
            .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
    }

    /// Store raw bytes, creating parent directories.
    pub fn insert_bytes(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.into();
            if let Some(parent) = path.parent() {
                insert_ancestors(&mut inner.directories, parent);
            }
            inner.files.insert(path, bytes.into());
        }
    }

    /// Make every later write at or below `path` fail.
    pub fn fail_writes_under(&self, path: impl Into<PathBuf>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing.push(path.into());
        }
    }

    /// Make every later rename fail when its source path contains `fragment`.
    pub fn fail_renames_from(&self, fragment: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing_renames.push(fragment.into());
        }
    }

    /// All file paths, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = inner.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn read(&self) -> StrataResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::LockPoisoned.into())
    }

    fn write(&self) -> StrataResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned.into())
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_ancestors(directories: &mut HashSet<PathBuf>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        directories.insert(current.clone());
    }
}

/// Re-root every entry at or below `from` onto `to`.
fn move_prefix<V>(
    entries: impl IntoIterator<Item = (PathBuf, V)>,
    from: &Path,
    to: &Path,
) -> Vec<(PathBuf, V)> {
    entries
        .into_iter()
        .map(|(path, value)| match path.strip_prefix(from) {
            Ok(rest) if rest.as_os_str().is_empty() => (to.to_path_buf(), value),
            Ok(rest) => (to.join(rest), value),
            Err(_) => (path, value),
        })
        .collect()
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> StrataResult<()> {
        let mut inner = self.write()?;
        insert_ancestors(&mut inner.directories, path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> StrataResult<()> {
        let mut inner = self.write()?;

        if inner.failing.iter().any(|f| path.starts_with(f)) {
            return Err(ApplicationError::filesystem(path, "injected write failure").into());
        }

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(
                    ApplicationError::filesystem(path, "Parent directory does not exist").into(),
                );
            }
        }

        inner
            .files
            .insert(path.to_path_buf(), content.as_bytes().to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_dir_all(&self, path: &Path) -> StrataResult<()> {
        let mut inner = self.write()?;
        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> StrataResult<()> {
        let mut inner = self.write()?;

        let source = from.to_string_lossy();
        if inner
            .failing_renames
            .iter()
            .any(|fragment| source.contains(fragment.as_str()))
        {
            return Err(ApplicationError::filesystem(from, "injected rename failure").into());
        }

        if inner.files.contains_key(to) || inner.directories.contains(to) {
            return Err(ApplicationError::filesystem(to, "destination already exists").into());
        }
        if !inner.files.contains_key(from) && !inner.directories.contains(from) {
            return Err(ApplicationError::filesystem(from, "source does not exist").into());
        }

        let files = std::mem::take(&mut inner.files);
        inner.files = move_prefix(files, from, to).into_iter().collect();

        let directories = std::mem::take(&mut inner.directories);
        inner.directories = move_prefix(directories.into_iter().map(|d| (d, ())), from, to)
            .into_iter()
            .map(|(d, ())| d)
            .collect();
        if let Some(parent) = to.parent() {
            insert_ancestors(&mut inner.directories, parent);
        }

        Ok(())
    }

    fn read_text(&self, path: &Path) -> StrataResult<Option<String>> {
        let inner = self.read()?;
        match inner.files.get(path) {
            Some(bytes) => Ok(String::from_utf8(bytes.clone()).ok()),
            None => Err(ApplicationError::filesystem(path, "file not found").into()),
        }
    }

    fn list_files(
        &self,
        root: &Path,
        skip_dirs: &[String],
        max_depth: usize,
    ) -> StrataResult<Vec<PathBuf>> {
        let inner = self.read()?;
        Ok(inner
            .files
            .keys()
            .filter(|path| {
                let Ok(relative) = path.strip_prefix(root) else {
                    return false;
                };
                let parts: Vec<_> = relative.components().collect();
                if parts.is_empty() || parts.len() > max_depth {
                    return false;
                }
                !parts[..parts.len() - 1].iter().any(|dir| {
                    let name = dir.as_os_str().to_string_lossy();
                    skip_dirs.iter().any(|skip| name == skip.as_str())
                })
            })
            .cloned()
            .collect())
    }
}
