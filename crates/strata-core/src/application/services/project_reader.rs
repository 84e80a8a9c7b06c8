//! Reads a materialized project tree back into `GeneratedFile`s.

use std::path::PathBuf;
use tracing::{debug, instrument};

use crate::{
    application::{ports::Filesystem, services::materializer::STAGING_MARKER},
    domain::{ArtifactClass, DomainValidator, GeneratedFile, RelativePath},
    error::StrataResult,
};

/// Directories never descended into.
pub const SKIP_DIRS: [&str; 7] = [
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "coverage",
    "target",
];

pub const MAX_DEPTH: usize = 16;

pub struct ProjectReader {
    filesystem: Box<dyn Filesystem>,
    output_root: PathBuf,
}

impl ProjectReader {
    pub fn new(filesystem: Box<dyn Filesystem>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            filesystem,
            output_root: output_root.into(),
        }
    }

    /// Every text file of the project, sorted by path.
    ///
    /// A missing project directory yields an empty list.
    #[instrument(skip(self), fields(root = %self.output_root.display()))]
    pub fn list_project_files(&self, project_id: &str) -> StrataResult<Vec<GeneratedFile>> {
        DomainValidator::validate_project_id(project_id)?;

        let project_dir = self.output_root.join(project_id);
        if !self.filesystem.exists(&project_dir) {
            debug!(path = %project_dir.display(), "Project directory missing");
            return Ok(Vec::new());
        }

        let skip: Vec<String> = SKIP_DIRS.iter().map(|s| s.to_string()).collect();
        let paths = self.filesystem.list_files(&project_dir, &skip, MAX_DEPTH)?;

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let Ok(relative) = path.strip_prefix(&project_dir) else {
                continue;
            };
            if relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().contains(STAGING_MARKER))
            {
                continue;
            }
            let Some(content) = self.filesystem.read_text(&path)? else {
                debug!(path = %path.display(), "Skipping non-text file");
                continue;
            };
            let relative = RelativePath::from_path(relative)?;
            files.push(GeneratedFile::new(relative, content));
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = files.len(), "Read project files");
        Ok(files)
    }

    pub fn list_by_class(
        &self,
        project_id: &str,
        class: ArtifactClass,
    ) -> StrataResult<Vec<GeneratedFile>> {
        Ok(self
            .list_project_files(project_id)?
            .into_iter()
            .filter(|f| f.class == class)
            .collect())
    }
}
