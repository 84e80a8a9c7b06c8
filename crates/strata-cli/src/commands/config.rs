//! `strata config`: read and write configuration values.

use std::path::Path;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Every key `get` and `set` understand.
pub const KEYS: [&str; 4] = [
    "output.no_color",
    "output.format",
    "materialize.output_root",
    "materialize.atomic",
];

pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.print(&format!("{key} = {value}"))?;
        }

        ConfigCommands::Set { key, value } => {
            let path = AppConfig::active_path(global.config.as_deref());
            set_in_file(&path, &key, &value)?;
            output.success(&format!("Set {key} = {value} in {}", path.display()))?;
        }

        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).with_cli_context(|| "Failed to serialise config")?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            output.print(
                &AppConfig::active_path(global.config.as_deref())
                    .display()
                    .to_string(),
            )?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn unknown_key(key: &str) -> CliError {
    CliError::ConfigError {
        message: format!("Unknown config key '{key}' (known: {})", KEYS.join(", ")),
        source: None,
    }
}

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    match key {
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "output.format" => Ok(config.output.format.clone()),
        "materialize.output_root" => Ok(config.materialize.output_root.display().to_string()),
        "materialize.atomic" => Ok(config.materialize.atomic.to_string()),
        _ => Err(unknown_key(key)),
    }
}

fn typed_value(key: &str, raw: &str) -> CliResult<toml::Value> {
    let invalid = |expected: &str| CliError::ConfigError {
        message: format!("'{raw}' is not a valid value for {key}; expected {expected}"),
        source: None,
    };

    match key {
        "output.no_color" | "materialize.atomic" => raw
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .map_err(|_| invalid("true or false")),
        "output.format" => match raw {
            "auto" | "human" | "plain" | "json" => Ok(toml::Value::String(raw.to_string())),
            _ => Err(invalid("auto, human, plain or json")),
        },
        "materialize.output_root" => Ok(toml::Value::String(raw.to_string())),
        _ => Err(unknown_key(key)),
    }
}

fn set_value(doc: &mut toml::Table, key: &str, raw: &str) -> CliResult<()> {
    let value = typed_value(key, raw)?;
    let (section, field) = key.split_once('.').ok_or_else(|| unknown_key(key))?;

    let entry = doc
        .entry(section)
        .or_insert(toml::Value::Table(toml::Table::new()));
    let Some(table) = entry.as_table_mut() else {
        return Err(CliError::ConfigError {
            message: format!("'{section}' in the config file is not a table"),
            source: None,
        });
    };
    table.insert(field.to_string(), value);
    Ok(())
}

/// Update one key in `path`, keeping every other key in the file.
fn set_in_file(path: &Path, key: &str, raw: &str) -> CliResult<()> {
    let mut doc = if path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read '{}'", path.display()))?;
        toml::from_str::<toml::Table>(&text)
            .with_cli_context(|| format!("Failed to parse '{}'", path.display()))?
    } else {
        toml::Table::new()
    };

    set_value(&mut doc, key, raw)?;

    let rendered =
        toml::to_string_pretty(&doc).with_cli_context(|| "Failed to serialise config")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    std::fs::write(path, rendered)
        .with_cli_context(|| format!("Failed to write '{}'", path.display()))
}

// ── tests ─────────────────────────────────────────────────────────────────────
