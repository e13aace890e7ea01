//! Interactive mode: one calculation per input line, debounced.
//!
//! Each line is a calculator subcommand with its flags, for example
//! `nl-income --gross 80000 --ruling 30`. Lines arriving in quick succession
//! only produce a report for the last one. A line of the form `:log <level>`
//! changes the log filter immediately and is never debounced.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use toolzer_core::CalculatorSet;

use crate::commands::CalcCommand;
use crate::debounce::debounce;
use crate::logging::{log_task_error, set_log_level};
use crate::render::{render_errors, render_report};

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct WatchLine {
    #[command(subcommand)]
    command: CalcCommand,
}

/// Parses and runs one input line, returning the text to show.
pub fn evaluate(
    calculators: &CalculatorSet,
    line: &str,
) -> String {
    let command = match WatchLine::try_parse_from(line.split_whitespace()) {
        Ok(parsed) => parsed.command,
        Err(error) => return error.render().to_string(),
    };

    match calculators.calculate(&command.to_input()) {
        Ok(result) => render_report(&result.report()),
        Err(errors) => {
            debug!(%errors, "input rejected");
            render_errors(&errors)
        }
    }
}

/// Reads lines from `reader` until it closes, writing one rendered report
/// per quiet period to `writer`.
pub async fn run_watch<R, W>(
    calculators: &CalculatorSet,
    reader: R,
    mut writer: W,
    quiet: Duration,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (tx, rx) = mpsc::channel::<String>(16);

    let reader_task = tokio::spawn(async move {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("failed to read input")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(level) = line.strip_prefix(":log ") {
                match set_log_level(level.trim()) {
                    Ok(()) => info!(level = level.trim(), "log level changed"),
                    Err(error) => warn!(%error, "log level unchanged"),
                }
                continue;
            }
            if tx.send(line.to_string()).await.is_err() {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    });

    let mut pending = debounce(rx, quiet);
    while let Some(line) = pending.recv().await {
        debug!(%line, "evaluating");
        let output = evaluate(calculators, &line);
        writer
            .write_all(output.as_bytes())
            .await
            .context("failed to write report")?;
        writer.flush().await.context("failed to flush output")?;
    }

    let joined = reader_task
        .await
        .context("input reader panicked")
        .and_then(|result| result);
    log_task_error("input reader", joined);
    Ok(())
}
