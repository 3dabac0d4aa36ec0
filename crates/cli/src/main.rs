//! Store Metrics CLI - report exports and schedule tools.
//!
//! # Usage
//!
//! ```bash
//! # Export yesterday's daily report (cron: 0 0 * * *)
//! sm-cli export daily
//!
//! # Export the month containing a date from a specific snapshot
//! sm-cli export monthly --date 2024-02-15 --data store.json
//!
//! # Render a report to stdout without writing it
//! sm-cli preview weekly --date 2024-03-03
//!
//! # Show schedules and next run times
//! sm-cli schedule
//!
//! # Check access to a period's spreadsheet
//! sm-cli test-connection daily
//! ```
//!
//! # Commands
//!
//! - `export` - Aggregate and write a report to its spreadsheet
//! - `preview` - Aggregate and print a report
//! - `schedule` - Show per-period settings and next run
//! - `test-connection` - Fetch the destination spreadsheet title
//!
//! Logs go to stderr; set `LOG_FORMAT=json` for structured output.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use storemetrics_core::Period;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "sm-cli")]
#[command(author, version, about = "Store metrics reporting tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a report to its spreadsheet
    Export {
        /// Report period (`daily`, `weekly`, `monthly`)
        period: Period,

        /// Reference date (YYYY-MM-DD, default: yesterday)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Store snapshot (JSON or YAML, default: `REPORT_DATA_FILE`)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Print a report without writing it
    Preview {
        /// Report period (`daily`, `weekly`, `monthly`)
        period: Period,

        /// Reference date (YYYY-MM-DD, default: yesterday)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Store snapshot (JSON or YAML, default: `REPORT_DATA_FILE`)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Show export schedules
    Schedule,
    /// Check access to a period's spreadsheet
    TestConnection {
        /// Report period (`daily`, `weekly`, `monthly`)
        period: Period,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Text logs by default, JSON when `LOG_FORMAT=json`. Both write to stderr.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storemetrics_reporting=info,sm_cli=info".into());

    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Export { period, date, data } => {
            commands::export::run(period, date, data.as_deref()).await?;
        }
        Commands::Preview { period, date, data } => {
            commands::preview::run(period, date, data.as_deref())?;
        }
        Commands::Schedule => commands::schedule::run()?,
        Commands::TestConnection { period } => commands::connection::run(period).await?,
    }
    Ok(())
}
