mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{Cli, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    tracing::debug!(?cli, "CLI arguments parsed");

    match run(cli) {
        Ok(report) => {
            tracing::debug!(
                n_errors = report.error_count(),
                n_warnings = report.warning_count(),
                "CLI completed"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "CLI exited with error");
            eprintln!("✗ Error: {e}");
            ExitCode::FAILURE
        }
    }
}
