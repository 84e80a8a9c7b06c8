//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name     = "strata",
    bin_name = "strata",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Materialize a full-stack project from one application model",
    long_about = "Strata reads a project model (modules, tables, screens) and writes \
                  a Prisma schema, Express routers and React pages that agree with \
                  each other on every name and type.",
    after_help = "EXAMPLES:\n\
        \x20 strata generate billing.json\n\
        \x20 strata generate model.toml -o ./out --atomic\n\
        \x20 strata files billing --class persistence\n\
        \x20 strata inspect name unit_price \"Unit Price\"\n\
        \x20 strata completions bash > /usr/share/bash-completion/completions/strata",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a project tree from a model file.
    #[command(
        visible_alias = "gen",
        about = "Generate a project from a model file",
        after_help = "EXAMPLES:\n\
            \x20 strata generate billing.json\n\
            \x20 strata generate billing.json --dry-run --format json\n\
            \x20 strata generate billing.toml -o ./projects --force --atomic"
    )]
    Generate(GenerateArgs),

    /// List the files of a generated project.
    #[command(
        visible_alias = "ls",
        about = "List the files of a generated project",
        after_help = "EXAMPLES:\n\
            \x20 strata files billing\n\
            \x20 strata files billing --class service --format list\n\
            \x20 strata files billing -o ./projects --format csv"
    )]
    Files(FilesArgs),

    /// Show how names and column types are interpreted.
    #[command(
        about = "Inspect name and type resolution",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 strata inspect name InvoiceLine unit_price\n\
            \x20 strata inspect type \"decimal(10,2)\" timestamptz money"
    )]
    Inspect(InspectCommands),

    /// Initialise a Strata configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 strata init           # user config directory\n\
            \x20 strata init --local   # .strata.toml in the current directory"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 strata completions bash > ~/.local/share/bash-completion/completions/strata\n\
            \x20 strata completions zsh  > ~/.zfunc/_strata\n\
            \x20 strata completions fish > ~/.config/fish/completions/strata.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Strata configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 strata config get materialize.output_root\n\
            \x20 strata config set materialize.atomic true\n\
            \x20 strata config list"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Project model, `.json` or `.toml`.
    #[arg(value_name = "CONTEXT", help = "Project model file (.json or .toml)")]
    pub context: PathBuf,

    /// Directory that receives `<project_id>/`. Defaults to
    /// `materialize.output_root` from the configuration.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output root (default: materialize.output_root)"
    )]
    pub output: Option<PathBuf>,

    /// Write into a staging directory and swap it in on success.
    #[arg(long = "atomic", help = "Stage the tree and swap it in on success")]
    pub atomic: bool,

    /// Generate and report without writing.
    #[arg(long = "dry-run", help = "Show what would be written without writing")]
    pub dry_run: bool,

    /// Regenerate over an existing project directory.
    #[arg(long = "force", help = "Overwrite an existing project directory")]
    pub force: bool,

    /// Skip the confirmation prompt before overwriting.
    #[arg(short = 'y', long = "yes", help = "Do not ask before overwriting")]
    pub yes: bool,

    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Human,
    Json,
}

// ── files ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[arg(value_name = "PROJECT_ID", help = "Identifier of a generated project")]
    pub project_id: String,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output root (default: materialize.output_root)"
    )]
    pub output: Option<PathBuf>,

    /// Only files of this class: persistence, service, presentation, config.
    #[arg(long = "class", value_name = "CLASS", help = "Filter by artifact class")]
    pub class: Option<String>,

    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Aligned columns: class, size, path.
    Table,
    /// One path per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── inspect ───────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum InspectCommands {
    /// Print the case renderings of each name.
    Name {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Print the storage, transport and display type of each semantic type.
    Type {
        #[arg(required = true, value_name = "TYPE")]
        types: Vec<String>,

        /// Engine whose native type attributes are shown.
        #[arg(
            short = 'd',
            long = "database",
            value_name = "ENGINE",
            default_value = "postgres",
            help = "Database engine (postgres, mysql, sqlite, sqlserver)"
        )]
        database: String,
    },
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the user config directory (the default).
    #[arg(long = "global", conflicts_with = "local", help = "Create user configuration")]
    pub global: bool,

    /// Write to `.strata.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `materialize.output_root`.
        key: String,
    },
    /// Set a configuration key in the active configuration file.
    Set {
        key: String,
        value: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
