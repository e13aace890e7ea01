use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{BufReader, stdin, stdout};
use tracing::debug;

use toolzer_cli::logging::{enable_file_logging, init_logging};
use toolzer_cli::render::{render_errors, render_report};
use toolzer_cli::watch::run_watch;
use toolzer_cli::{Cli, Command, load_calculators};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;
    if let Some(path) = &cli.log_file {
        enable_file_logging(path)?;
    }

    let calculators = load_calculators(cli.config.as_deref())?;

    match cli.command {
        Command::Calc(command) => {
            let input = command.to_input();
            debug!(?input, "calculating");
            match calculators.calculate(&input) {
                Ok(result) => {
                    print!("{}", render_report(&result.report()));
                    Ok(ExitCode::SUCCESS)
                }
                Err(errors) => {
                    eprint!("{}", render_errors(&errors));
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Watch { debounce_ms } => {
            run_watch(
                &calculators,
                BufReader::new(stdin()),
                stdout(),
                Duration::from_millis(debounce_ms),
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
