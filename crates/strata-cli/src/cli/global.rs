//! Flags shared by every subcommand.
//!
//! Flattened into [`super::Cli`] with `global = true`, so `strata files -q x`
//! and `strata -q files x` mean the same thing.

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Increase logging verbosity.
    ///
    /// Pass once for INFO (`-v`), twice for DEBUG (`-vv`), three times for
    /// TRACE (`-vvv`). Conflicts with `--quiet`.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)",
        long_help = "Increase logging verbosity:
    (none)  - Warnings and errors
    -v      - Info level (emitter and write progress)
    -vv     - Debug level (per-file decisions)
    -vvv    - Trace level (very verbose)"
    )]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Disable ANSI colour codes. Honours `NO_COLOR` (<https://no-color.org>).
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::BoolishValueParser::new(),
        help = "Disable colored output"
    )]
    pub no_color: bool,

    /// Explicit configuration file. Must exist when given.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        env = "STRATA_CONFIG",
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "Output format"
    )]
    pub output_format: OutputFormat,
}

/// How human-facing messages are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human when stdout is a terminal, plain otherwise.
    #[default]
    Auto,
    /// Colored, with symbols.
    Human,
    /// No ANSI codes.
    Plain,
    /// Machine-readable JSON on stdout.
    Json,
}
