//! Materializer - main application orchestrator.
//!
//! This service coordinates the whole generation workflow:
//! 1. Validate and plan the project model
//! 2. Run every emitter
//! 3. Write the file tree under `<output_root>/<project_id>`

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{
        DomainValidator, Emitter, GeneratedFile, Generation, MaterializedProject, ProjectContext,
        RunCommands, Severity, default_emitters, generate,
    },
    error::{StrataError, StrataResult},
};

/// Directories created up front, even when no file lands in them.
pub const LAYOUT_DIRS: [&str; 5] = [
    "backend/prisma",
    "backend/src/routes",
    "backend/src/db",
    "frontend/src/pages",
    "frontend/src/components",
];

/// Infix of sibling staging directories, `.<project_id>.staging-<uuid>`.
pub const STAGING_MARKER: &str = ".staging-";

/// Infix of the previous tree while a staged swap is in flight,
/// `.<project_id>.previous-<uuid>`.
pub const BACKUP_MARKER: &str = ".previous-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write straight into the project directory. Re-running overwrites
    /// files in place and leaves unrelated files alone.
    #[default]
    InPlace,
    /// Write into a staging directory, then swap it in on success.
    Staged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeSettings {
    pub output_root: PathBuf,
    pub write_mode: WriteMode,
}

impl MaterializeSettings {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }
}

/// Turns a `ProjectContext` into a project tree on disk.
pub struct Materializer {
    filesystem: Box<dyn Filesystem>,
    settings: MaterializeSettings,
    emitters: Vec<Box<dyn Emitter>>,
}

impl Materializer {
    pub fn new(filesystem: Box<dyn Filesystem>, settings: MaterializeSettings) -> Self {
        Self {
            filesystem,
            settings,
            emitters: default_emitters(),
        }
    }

    /// Replace the emitter set. Order is preserved.
    pub fn with_emitters(mut self, emitters: Vec<Box<dyn Emitter>>) -> Self {
        self.emitters = emitters;
        self
    }

    /// `<output_root>/<project_id>`.
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.settings.output_root.join(project_id)
    }

    pub fn project_exists(&self, project_id: &str) -> bool {
        DomainValidator::validate_project_id(project_id).is_ok()
            && self.filesystem.exists(&self.project_dir(project_id))
    }

    /// Generate without writing.
    #[instrument(skip_all, fields(project = %context.project_id))]
    pub fn preview(&self, context: &ProjectContext) -> StrataResult<Generation> {
        let generation = generate(context, &self.emitters)?;
        log_diagnostics(&generation);
        info!(
            files = generation.files.len(),
            bytes = generation.total_bytes(),
            "Generated project preview"
        );
        Ok(generation)
    }

    /// Generate and write the project.
    #[instrument(
        skip_all,
        fields(
            project = %context.project_id,
            output_root = %self.settings.output_root.display(),
            mode = ?self.settings.write_mode
        )
    )]
    pub fn materialize(&self, context: &ProjectContext) -> StrataResult<MaterializedProject> {
        let generation = self.preview(context)?;
        let project_dir = self.project_dir(&context.project_id);

        match self.settings.write_mode {
            WriteMode::InPlace => {
                self.write_tree(&project_dir, &project_dir, &generation.files)?
            }
            WriteMode::Staged => {
                self.write_staged(&context.project_id, &project_dir, &generation.files)?
            }
        }

        info!(
            files = generation.files.len(),
            path = %project_dir.display(),
            "Project materialized"
        );

        Ok(MaterializedProject {
            project_dir,
            files: generation.files,
            commands: RunCommands::default(),
            diagnostics: generation.diagnostics,
        })
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Layout directories, then one write per file. Stops at the first error.
    fn write_tree(
        &self,
        root: &Path,
        project_dir: &Path,
        files: &[GeneratedFile],
    ) -> StrataResult<()> {
        let total = files.len();
        let failed = |written: usize, path: &Path, err: StrataError| -> StrataError {
            warn!(written, total, path = %path.display(), error = %err, "Write pass aborted");
            ApplicationError::MaterializationFailed {
                project_dir: project_dir.to_path_buf(),
                written,
                total,
                path: path.to_path_buf(),
                reason: reason_of(err),
            }
            .into()
        };

        self.filesystem
            .create_dir_all(root)
            .map_err(|e| failed(0, root, e))?;
        for dir in LAYOUT_DIRS {
            let path = root.join(dir);
            self.filesystem
                .create_dir_all(&path)
                .map_err(|e| failed(0, &path, e))?;
        }

        for (written, file) in files.iter().enumerate() {
            let path = root.join(file.path.to_path_buf());
            if let Some(parent) = path.parent() {
                self.filesystem
                    .create_dir_all(parent)
                    .map_err(|e| failed(written, &path, e))?;
            }
            self.filesystem
                .write_file(&path, &file.content)
                .map_err(|e| failed(written, &path, e))?;
            debug!(path = %file.path, class = %file.class, bytes = file.size(), "Wrote file");
        }

        Ok(())
    }

    fn write_staged(
        &self,
        project_id: &str,
        project_dir: &Path,
        files: &[GeneratedFile],
    ) -> StrataResult<()> {
        let staging = self.settings.output_root.join(format!(
            ".{project_id}{STAGING_MARKER}{}",
            Uuid::new_v4().simple()
        ));
        debug!(staging = %staging.display(), "Staging project");

        if let Err(e) = self.write_tree(&staging, project_dir, files) {
            self.discard(&staging);
            return Err(e);
        }

        let swap = |err: StrataError| -> StrataError {
            ApplicationError::MaterializationFailed {
                project_dir: project_dir.to_path_buf(),
                written: files.len(),
                total: files.len(),
                path: project_dir.to_path_buf(),
                reason: reason_of(err),
            }
            .into()
        };

        // The previous tree is only moved aside, so a failed swap can put it back.
        let backup = if self.filesystem.exists(project_dir) {
            let backup = self.settings.output_root.join(format!(
                ".{project_id}{BACKUP_MARKER}{}",
                Uuid::new_v4().simple()
            ));
            if let Err(e) = self.filesystem.rename(project_dir, &backup) {
                self.discard(&staging);
                return Err(swap(e));
            }
            debug!(backup = %backup.display(), "Moved previous project aside");
            Some(backup)
        } else {
            None
        };

        if let Err(e) = self.filesystem.rename(&staging, project_dir) {
            if let Some(backup) = &backup {
                self.restore(backup, project_dir);
            }
            self.discard(&staging);
            return Err(swap(e));
        }

        if let Some(backup) = &backup {
            self.discard(backup);
        }

        Ok(())
    }

    /// Put a moved-aside project back. Failure leaves the backup on disk.
    fn restore(&self, backup: &Path, project_dir: &Path) {
        match self.filesystem.rename(backup, project_dir) {
            Ok(()) => info!(path = %project_dir.display(), "Restored previous project"),
            Err(e) => warn!(
                error = %e,
                backup = %backup.display(),
                path = %project_dir.display(),
                "Could not restore previous project; it is kept at the backup path"
            ),
        }
    }

    /// Best-effort removal of a staging or backup directory.
    fn discard(&self, dir: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(dir) {
            warn!(error = %e, path = %dir.display(), "Could not remove directory");
        } else {
            info!(path = %dir.display(), "Removed directory");
        }
    }
}

fn log_diagnostics(generation: &Generation) {
    for d in &generation.diagnostics {
        match d.severity {
            Severity::Warning => warn!(subject = %d.subject, "{}", d.message),
            Severity::Info => debug!(subject = %d.subject, "{}", d.message),
        }
    }
}

/// Low-level reason without the wrapping layers' prefixes.
fn reason_of(err: StrataError) -> String {
    match err {
        StrataError::Application(ApplicationError::FilesystemError { reason, .. }) => reason,
        other => other.to_string(),
    }
}
