//! Implementation of the `strata generate` command.
//!
//! Responsibility: load the model, configure the materializer from flags and
//! config, and report the result. No generation logic lives here.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use strata_adapters::{ContextLoader, LocalFilesystem};
use strata_core::{
    application::{MaterializeSettings, Materializer, WriteMode},
    domain::{ArtifactClass, Diagnostic, GeneratedFile, RunCommands, Severity},
};

use crate::{
    cli::{GenerateArgs, OutputFormat, ReportFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `strata generate` command.
///
/// 1. Load the model file
/// 2. Resolve the output root and write mode
/// 3. Dry run: generate and report, write nothing
/// 4. Refuse to overwrite without `--force`, confirm unless `--yes`
/// 5. Materialize and report files, diagnostics and run commands
#[instrument(skip_all, fields(context = %args.context.display()))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let context = ContextLoader::new().load(&args.context)?;

    let settings = resolve_settings(&args, &config);
    debug!(
        output_root = %settings.output_root.display(),
        mode = ?settings.write_mode,
        "Settings resolved"
    );
    let materializer = Materializer::new(Box::new(LocalFilesystem::new()), settings);
    let project_dir = materializer.project_dir(&context.project_id);
    let json = args.format == ReportFormat::Json || output.format() == OutputFormat::Json;

    if args.dry_run {
        let generation = materializer.preview(&context)?;
        let report = Report::new(
            &context.project_id,
            &project_dir,
            true,
            &generation.files,
            &generation.diagnostics,
            None,
        );
        return if json {
            output.json(&report)
        } else {
            print_dry_run(&report, &generation.files, &output)
        };
    }

    if materializer.project_exists(&context.project_id) {
        if !args.force {
            return Err(CliError::ProjectExists { path: project_dir });
        }
        let ask = !args.yes && !global.quiet && !json && output.is_interactive();
        if ask && !confirm(&project_dir)? {
            return Err(CliError::Cancelled);
        }
    }

    info!(
        project = %context.project_id,
        path = %project_dir.display(),
        "Generation started"
    );
    let spinner = output.spinner(format!("Writing {}", project_dir.display()));
    let result = materializer.materialize(&context);
    spinner.finish_and_clear();
    let project = result?;

    let report = Report::new(
        &context.project_id,
        &project.project_dir,
        false,
        &project.files,
        &project.diagnostics,
        Some(&project.commands),
    );
    if json {
        return output.json(&report);
    }

    output.success(&format!(
        "Generated '{}' at {} ({} files, {} bytes)",
        context.display_name(),
        project.project_dir.display(),
        project.files.len(),
        project.total_bytes(),
    ))?;
    print_class_summary(&project.files, &output)?;
    print_diagnostics(&project.diagnostics, &output)?;
    print_next_steps(&project.project_dir, &project.commands, &output)?;
    Ok(())
}

fn resolve_settings(args: &GenerateArgs, config: &AppConfig) -> MaterializeSettings {
    let output_root = args
        .output
        .clone()
        .unwrap_or_else(|| config.materialize.output_root.clone());
    let write_mode = if args.atomic || config.materialize.atomic {
        WriteMode::Staged
    } else {
        WriteMode::InPlace
    };
    MaterializeSettings::new(output_root).with_write_mode(write_mode)
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    project_id: &'a str,
    project_dir: PathBuf,
    dry_run: bool,
    files: Vec<FileEntry<'a>>,
    diagnostics: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    commands: Option<&'a RunCommands>,
}

#[derive(Debug, Serialize)]
struct FileEntry<'a> {
    path: &'a str,
    class: ArtifactClass,
    bytes: usize,
}

impl<'a> Report<'a> {
    fn new(
        project_id: &'a str,
        project_dir: &Path,
        dry_run: bool,
        files: &'a [GeneratedFile],
        diagnostics: &'a [Diagnostic],
        commands: Option<&'a RunCommands>,
    ) -> Self {
        Self {
            project_id,
            project_dir: project_dir.to_path_buf(),
            dry_run,
            files: files
                .iter()
                .map(|f| FileEntry {
                    path: f.path.as_str(),
                    class: f.class,
                    bytes: f.size(),
                })
                .collect(),
            diagnostics,
            commands,
        }
    }
}

// ── Human output ──────────────────────────────────────────────────────────────

fn print_dry_run(
    report: &Report<'_>,
    files: &[GeneratedFile],
    out: &OutputManager,
) -> CliResult<()> {
    out.info(&format!(
        "Dry run: would write {} files to {}",
        report.files.len(),
        report.project_dir.display(),
    ))?;
    for file in &report.files {
        out.print(&format!("  {:<13} {:>7}  {}", file.class.as_str(), file.bytes, file.path))?;
    }
    print_class_summary(files, out)?;
    print_diagnostics(report.diagnostics, out)?;
    Ok(())
}

fn print_class_summary(files: &[GeneratedFile], out: &OutputManager) -> CliResult<()> {
    let counts: Vec<String> = ArtifactClass::ALL
        .iter()
        .map(|class| {
            let n = files.iter().filter(|f| f.class == *class).count();
            format!("{n} {class}")
        })
        .collect();
    out.detail(&format!("  {}", counts.join(", ")))?;
    Ok(())
}

fn print_diagnostics(diagnostics: &[Diagnostic], out: &OutputManager) -> CliResult<()> {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => out.warning(&diagnostic.to_string())?,
            Severity::Info => out.info(&diagnostic.to_string())?,
        }
    }
    Ok(())
}

fn print_next_steps(
    project_dir: &Path,
    commands: &RunCommands,
    out: &OutputManager,
) -> CliResult<()> {
    out.print("")?;
    out.header("Next steps:")?;
    out.print(&format!("  cd {}", project_dir.display()))?;
    out.print(&format!("  {}", commands.install))?;
    out.print(&format!("  {}", commands.migrate))?;
    out.print(&format!("  {}", commands.start))?;
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm(project_dir: &Path) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!("Regenerate over {}?", project_dir.display()))
        .default(true)
        .interact()
        .map_err(|e| CliError::InvalidInput {
            message: "failed to read confirmation".into(),
            source: Some(Box::new(e)),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(project_dir: &Path) -> CliResult<bool> {
    use std::io::{self, Write};

    use crate::error::IntoCli;

    print!("Regenerate over {}? [Y/n] ", project_dir.display());
    io::stdout()
        .flush()
        .with_cli_context(|| "failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_cli_context(|| "failed to read confirmation input")?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input.is_empty() || input == "y" || input == "yes")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
