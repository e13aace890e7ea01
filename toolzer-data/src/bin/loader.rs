use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use toolzer_core::{CalculatorSet, MAX_AMOUNT, RatesConfig};
use toolzer_data::ScheduleLoader;
use tracing_subscriber::EnvFilter;

/// Load bracket schedules from a CSV file into a rates file.
///
/// The CSV file should have the following columns:
/// - schedule: The schedule code (DE, NL, PT, PT-SOLIDARITY, US-X, US-Y-1, US-Y-2, US-Z)
/// - lower_bound: The income at which the bracket starts
/// - rate: The marginal tax rate as a decimal (e.g., 0.10)
/// - rate_end: Optional end rate of a linear progression bracket
#[derive(Parser, Debug)]
#[command(name = "toolzer-schedules")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing bracket schedules
    #[arg(short, long)]
    file: PathBuf,

    /// Rates file to start from (built-in 2025 rates when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the merged rates file here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the tax each loaded schedule levies on this amount
    #[arg(short, long)]
    sample: Option<Decimal>,
}

/// `RUST_LOG` when set, `info` otherwise; logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RatesConfig::load(path)
            .with_context(|| format!("Failed to load rates file: {}", path.display()))?,
        None => RatesConfig::default(),
    };

    println!("Loading schedules from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = ScheduleLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let tables = ScheduleLoader::tables(&records).context("Invalid schedule table")?;
    let written = ScheduleLoader::apply(&mut config, &tables)
        .context("Failed to apply schedules to rates")?;

    CalculatorSet::new(config.clone()).context("Merged rates are not usable")?;

    println!(
        "Loaded {} schedules into {} rate tables.",
        tables.len(),
        written
    );

    if let Some(amount) = args.sample {
        anyhow::ensure!(
            amount <= MAX_AMOUNT,
            "--sample must not exceed {MAX_AMOUNT}, got {amount}"
        );
        for table in &tables {
            println!(
                "{:<14} tax on {}: {} (marginal {})",
                table.code,
                amount,
                table.schedule.tax(amount).round_dp(2),
                table.schedule.marginal_rate(amount)
            );
        }
    }

    if let Some(output) = &args.output {
        let rendered = config.to_toml_string().context("Failed to render rates")?;
        fs::write(output, rendered)
            .with_context(|| format!("Failed to write: {}", output.display()))?;
        println!("Wrote rates file: {}", output.display());
    }

    Ok(())
}
