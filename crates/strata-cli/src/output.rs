//! Output management and formatting.

use std::io::{self, IsTerminal};
use std::time::Duration;

use clap::ValueEnum;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;
use crate::error::CliResult;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // The flag wins; an unrecognised config value counts as auto.
        let requested = if args.output_format == OutputFormat::Auto {
            OutputFormat::from_str(&config.output.format, true).unwrap_or_default()
        } else {
            args.output_format
        };

        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}")
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}")
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}")
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Dimmed secondary text.
    pub fn detail(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.dimmed().to_string()
        };
        self.term.write_line(&line)
    }

    /// Pretty JSON on stdout. Written even in quiet mode.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        self.term.write_line(&rendered)?;
        Ok(())
    }

    /// A spinner on stderr, hidden unless a human is watching.
    pub fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        if self.quiet || self.resolved_format != OutputFormat::Human || !io::stderr().is_terminal()
        {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Prompts make sense: not quiet and stdin is a terminal.
    pub fn is_interactive(&self) -> bool {
        !self.quiet && io::stdin().is_terminal()
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager(quiet: bool, format: OutputFormat) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            no_color: false,
            config: None,
            output_format: format,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, OutputFormat::Plain);
        assert!(out.print("hello").is_ok());
        assert!(!out.is_interactive());
    }

    #[test]
    fn json_is_written_in_quiet_mode() {
        let out = make_manager(true, OutputFormat::Json);
        assert!(out.json(&["a", "b"]).is_ok());
    }

    #[test]
    fn only_human_output_is_colored() {
        assert!(!make_manager(false, OutputFormat::Human).no_color);
        assert!(make_manager(false, OutputFormat::Plain).no_color);
        assert!(make_manager(false, OutputFormat::Json).no_color);
    }

    #[test]
    fn config_format_applies_when_flag_is_auto() {
        let mut config = AppConfig::default();
        config.output.format = "json".into();
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: false,
            config: None,
            output_format: OutputFormat::Auto,
        };
        assert_eq!(
            OutputManager::new(&args, &config).format(),
            OutputFormat::Json
        );
    }

    #[test]
    fn spinner_is_hidden_outside_human_mode() {
        let out = make_manager(false, OutputFormat::Plain);
        assert!(out.spinner("working").is_hidden());
    }
}
