//! Core library entry for the `seqcode` CLI.
//!
//! Issues sequential, per-period asset and maintenance-ticket codes such as
//! `LAPTOP-2501-0001` and `TKT-2503-0038`, and keeps the asset/ticket
//! records that carry them.

pub mod adapters;
pub mod api;
pub mod cli;
pub mod code;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod planner;
pub mod ports;
pub mod registry;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing, configuration, or command
/// execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    let config = config::Config::from_env()?;
    init_logging(&config.log_filter);
    commands::dispatch(&cli.command, &config)
}

/// Installs the stderr `tracing` subscriber. Later calls are no-ops.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_executes_parse() {
        let result = run(["seqcode", "parse", "LAPTOP-2501-0001"]);
        assert!(result.is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["seqcode", "unknown"]);
        assert!(result.is_err());
    }
}
