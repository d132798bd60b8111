//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use std::process::ExitCode;

use makegraph::{cli::Cli, runner};
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = Cli::parse_with_default();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "makegraph failed");
            let forwarded = err
                .downcast_ref::<runner::RunnerError>()
                .and_then(runner::RunnerError::exit_code)
                .and_then(|code| u8::try_from(code).ok())
                .filter(|code| *code != 0);
            forwarded.map_or(ExitCode::FAILURE, ExitCode::from)
        }
    }
}
