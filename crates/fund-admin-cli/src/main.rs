mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::fees::FeesArgs;
use commands::performance::PerformanceArgs;
use commands::waterfall::WaterfallArgs;

/// Private-fund capital transaction calculations
#[derive(Parser)]
#[command(
    name = "fadmin",
    version,
    about = "Private-fund capital transaction calculations",
    long_about = "A CLI for private-fund administration calculations with decimal \
                  precision. Supports management fee breakdowns, distribution \
                  waterfalls, and fund performance metrics (IRR, TVPI, DPI, RVPI, \
                  MOIC)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a management fee breakdown (standard or dual-rate)
    Fees(FeesArgs),
    /// Run a distribution waterfall (ROC / preferred / catch-up / residual)
    Waterfall(WaterfallArgs),
    /// Calculate fund performance metrics (IRR, TVPI, DPI, RVPI, MOIC)
    Performance(PerformanceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Fees(args) => commands::fees::run_fees(args),
        Commands::Waterfall(args) => commands::waterfall::run_waterfall(args),
        Commands::Performance(args) => commands::performance::run_performance(args),
        Commands::Version => {
            println!("fadmin {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
