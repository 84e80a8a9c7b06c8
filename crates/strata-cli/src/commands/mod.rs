//! One module per subcommand. Each exposes an `execute` entry point that
//! translates parsed arguments into core calls and prints the outcome.

pub mod completions;
pub mod config;
pub mod files;
pub mod generate;
pub mod init;
pub mod inspect;
