//! Implementation of the `strata files` command.

use serde::Serialize;
use tracing::instrument;

use strata_adapters::LocalFilesystem;
use strata_core::{
    application::ProjectReader,
    domain::{ArtifactClass, GeneratedFile},
    error::StrataError,
};

use crate::{
    cli::{FilesArgs, ListFormat, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct FileRow<'a> {
    path: &'a str,
    class: ArtifactClass,
    bytes: usize,
}

#[instrument(skip_all, fields(project = %args.project_id))]
pub fn execute(args: FilesArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let class = parse_class(args.class.as_deref())?;
    let root = args
        .output
        .unwrap_or_else(|| config.materialize.output_root.clone());

    let reader = ProjectReader::new(Box::new(LocalFilesystem::new()), root.clone());
    let files = reader.list_project_files(&args.project_id)?;
    if files.is_empty() {
        return Err(CliError::ProjectNotFound {
            project_id: args.project_id,
            root,
        });
    }

    let selected: Vec<&GeneratedFile> = files
        .iter()
        .filter(|f| class.is_none_or(|c| f.class == c))
        .collect();

    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            output.header(&format!(
                "Files of '{}' ({} of {}):",
                args.project_id,
                selected.len(),
                files.len()
            ))?;
            for file in &selected {
                output.print(&format!(
                    "  {:<13} {:>7}  {}",
                    file.class.as_str(),
                    file.size(),
                    file.path
                ))?;
            }
        }

        ListFormat::List => {
            for file in &selected {
                println!("{}", file.path);
            }
        }

        ListFormat::Json => {
            let rows: Vec<FileRow<'_>> = selected.iter().map(|f| row(f)).collect();
            output.json(&rows)?;
        }

        ListFormat::Csv => {
            println!("path,class,bytes");
            for file in &selected {
                println!("{}", csv_line(file));
            }
        }
    }

    Ok(())
}

fn parse_class(raw: Option<&str>) -> CliResult<Option<ArtifactClass>> {
    raw.map(str::parse::<ArtifactClass>)
        .transpose()
        .map_err(|e| CliError::Core(StrataError::from(e)))
}

fn row(file: &GeneratedFile) -> FileRow<'_> {
    FileRow {
        path: file.path.as_str(),
        class: file.class,
        bytes: file.size(),
    }
}

fn csv_line(file: &GeneratedFile) -> String {
    let path = file.path.as_str();
    let path = if path.contains(',') || path.contains('"') {
        format!("\"{}\"", path.replace('"', "\"\""))
    } else {
        path.to_string()
    };
    format!("{},{},{}", path, file.class, file.size())
}
