//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `STRATA__MATERIALIZE__OUTPUT_ROOT=out`
//! 3. `--config FILE`, or else `.strata.toml` in the working directory
//!    layered over the user config file
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Project-local configuration file name.
pub const LOCAL_CONFIG_FILE: &str = ".strata.toml";

/// Prefix of configuration environment variables; `__` separates segments.
pub const ENV_PREFIX: &str = "STRATA";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub materialize: MaterializeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--output-format` wins.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializeConfig {
    /// Directory that receives `<project_id>/`.
    pub output_root: PathBuf,
    /// Stage writes and swap the tree in on success.
    pub atomic: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("generated"),
            atomic: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, starting from defaults.
    ///
    /// `config_file` is the path passed via `--config`; when given it must
    /// exist and replaces the local and user files.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to seed configuration defaults")?;
        let mut builder = Config::builder().add_source(defaults);

        builder = match config_file {
            Some(path) => builder.add_source(toml_file(path).required(true)),
            None => builder
                .add_source(toml_file(&Self::user_config_path()).required(false))
                .add_source(toml_file(Path::new(LOCAL_CONFIG_FILE)).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration")?;
        config
            .try_deserialize()
            .context("Configuration has an invalid value")
    }

    /// Path to the user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.strata.toml` in the current directory.
    pub fn user_config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "strata", "strata")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// The file `config set` edits: the explicit file, else an existing
    /// local file, else the user file.
    pub fn active_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            local
        } else {
            Self::user_config_path()
        }
    }
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.materialize.output_root, PathBuf::from("generated"));
        assert!(!cfg.materialize.atomic);
        assert!(!cfg.output.no_color);
        assert_eq!(cfg.output.format, "auto");
    }

    #[test]
    fn explicit_file_overrides_only_what_it_names() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("strata.toml");
        std::fs::write(&path, "[materialize]\natomic = true\n").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert!(cfg.materialize.atomic);
        assert_eq!(cfg.materialize.output_root, PathBuf::from("generated"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn mistyped_value_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("strata.toml");
        std::fs::write(&path, "[materialize]\natomic = \"sometimes\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn explicit_path_is_active() {
        let p = Path::new("/tmp/custom.toml");
        assert_eq!(AppConfig::active_path(Some(p)), p);
    }

    #[test]
    fn user_config_path_is_non_empty() {
        assert!(!AppConfig::user_config_path().as_os_str().is_empty());
    }
}
