//! packflow CLI - replenishment recommendations from an inventory snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Rank SKUs by urgency and print order recommendations
//! packflow recommend --snapshot inventory.json --doi-goal 90
//!
//! # Print the default draft order for one supplier
//! packflow draft --snapshot inventory.json --supplier "Acme Glass"
//! ```
//!
//! Engine defaults come from `PACKFLOW_DOI_GOAL`, `PACKFLOW_SAFETY_BUFFER` and
//! `PACKFLOW_TIE_BREAK`; flags override them. Logs go to stderr (`RUST_LOG`,
//! `--log-format json|compact`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use packflow_observability::LogFormat;

mod commands;

#[derive(Parser)]
#[command(name = "packflow")]
#[command(author, version, about = "Packaging replenishment recommendations")]
struct Cli {
    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Json)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Json,
    Compact,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Compact => LogFormat::Compact,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank SKUs by days of inventory and print recommended order quantities
    Recommend {
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Build the default draft order for one supplier and validate it
    Draft {
        #[command(flatten)]
        engine: EngineArgs,

        /// Supplier to draft an order for
        #[arg(short, long)]
        supplier: String,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Snapshot file with `inventory` records and `demand` lines
    #[arg(long)]
    snapshot: PathBuf,

    /// Days of inventory to target (30, 60, 90, 120, 150 or 180)
    #[arg(long)]
    doi_goal: Option<u32>,

    /// Fraction of warehouse capacity to fill (0.70 to 1.00)
    #[arg(long)]
    safety_buffer: Option<f64>,

    /// Ordering among equal-DOI SKUs (`input` or `sku`)
    #[arg(long)]
    tie_break: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    packflow_observability::init(cli.log_format.into());

    if let Err(e) = run(cli) {
        tracing::error!("command failed: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Commands::Recommend { engine } => commands::recommend(&engine)?,
        Commands::Draft { engine, supplier } => commands::draft(&engine, &supplier)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
