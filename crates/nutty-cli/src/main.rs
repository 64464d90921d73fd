//! `nutty` CLI — find common free time from a JSON availability file.
//!
//! ## Usage
//!
//! ```sh
//! # Common free time for two users, as JSON
//! nutty common -i availability.json --user alice --user bob
//!
//! # Same, grouped by date in 12-hour time
//! nutty common -i availability.json --user alice --user bob --format text
//!
//! # Read records from stdin
//! cat availability.json | nutty common --user alice --user bob
//!
//! # Check a file for malformed or inverted records
//! nutty validate -i availability.json
//!
//! # Generate one record per day for a date range
//! nutty expand --user alice --from 2025-05-01 --to 2025-05-07 --start 09:00 --end 17:00
//! ```
//!
//! Set `RUST_LOG=nutty_engine=debug` to trace fetches and per-date sweeps.

use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use nutty_engine::{
    display, expand_date_range, parse_records_json, AvailabilityRecord, ClockTime,
    CommonTimeFinder, EngineConfig, InMemorySource, UserId,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nutty",
    version,
    about = "Find time when everyone in a group is free"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute common free time for a group of users
    Common {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// User to include; repeat for each member of the group
        #[arg(short, long = "user", required = true)]
        users: Vec<String>,
        /// Budget for fetching everyone's availability, in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Validate an availability file and report how many records it holds
    Validate {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Generate per-date availability records for a date range
    Expand {
        #[arg(short, long)]
        user: String,
        /// First date, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,
        /// Last date (inclusive), YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
        /// Daily start time, HH:MM
        #[arg(long)]
        start: String,
        /// Daily end time, HH:MM
        #[arg(long)]
        end: String,
        /// Existing availability file; dates already present there are skipped
        #[arg(long)]
        existing: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Common {
            input,
            users,
            timeout_ms,
            format,
        } => {
            let records = load_records(input.as_deref())?;
            let user_ids: Vec<UserId> = users.into_iter().map(UserId::from).collect();
            let config = EngineConfig::default().with_fetch_timeout(Duration::from_millis(timeout_ms));

            let finder = CommonTimeFinder::new(Arc::new(InMemorySource::from_records(records)))
                .with_config(config);
            let slots = finder
                .find(&user_ids)
                .await
                .context("Failed to compute common free time")?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&slots)?),
                OutputFormat::Text => print!("{}", display::render_report(&slots)),
            }
        }
        Commands::Validate { input } => {
            let records = load_records(input.as_deref())?;
            println!("{} valid availability record(s)", records.len());
        }
        Commands::Expand {
            user,
            from,
            to,
            start,
            end,
            existing,
        } => {
            let start: ClockTime = start
                .parse()
                .with_context(|| format!("Invalid --start time: {}", start))?;
            let end: ClockTime = end
                .parse()
                .with_context(|| format!("Invalid --end time: {}", end))?;
            let existing = match existing.as_deref() {
                Some(path) => load_records(Some(path))?,
                None => Vec::new(),
            };

            let records = expand_date_range(&UserId::from(user), from, to, start, end, &existing)
                .context("Failed to expand date range")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

fn load_records(path: Option<&str>) -> Result<Vec<AvailabilityRecord>> {
    let json = read_input(path)?;
    let records = parse_records_json(&json).context("Failed to parse availability records")?;
    tracing::debug!(count = records.len(), source = path.unwrap_or("stdin"), "loaded records");
    Ok(records)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
