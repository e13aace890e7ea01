pub mod commands;
pub mod debounce;
pub mod logging;
pub mod render;
pub mod utils;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use toolzer_core::{CalculatorSet, RatesConfig};

use crate::commands::CalcCommand;

/// Tax and benefit calculators for Germany, the Netherlands, Portugal, Spain
/// and the United States.
///
/// Reports go to stdout and logs to stderr.
#[derive(Debug, Parser)]
#[command(name = "toolzer", version)]
pub struct Cli {
    /// TOML file overriding the built-in 2025 rates.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter: a level such as `debug`, or a full directive. `RUST_LOG`
    /// takes precedence when set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Calc(CalcCommand),

    /// Read calculator lines from stdin and print a report once input settles
    Watch {
        /// Quiet period in milliseconds before a line is evaluated
        #[arg(long, default_value_t = 400)]
        debounce_ms: u64,
    },
}

/// Builds the calculators from `path`, or from the built-in rates.
pub fn load_calculators(path: Option<&Path>) -> Result<CalculatorSet> {
    let config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading rates");
            RatesConfig::load(path)
                .with_context(|| format!("Failed to load rates from {}", path.display()))?
        }
        None => {
            debug!("using built-in rates");
            RatesConfig::default()
        }
    };
    CalculatorSet::new(config).context("Rates configuration is not usable")
}
