//! AskMarket CLI
//!
//! Command-line interface for the marketplace:
//! - Run: Replay a JSON script against a fresh marketplace
//! - Demo: Walk through the canonical scenario
//! - Config: Print the effective configuration

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use askmarket_cli::{LoggingConfig, RunReport, Script, Settings};

#[derive(Parser, Debug)]
#[command(name = "askmarket")]
#[command(about = "AskMarket prompt marketplace driver")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "ASKMARKET_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ASKMARKET_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "ASKMARKET_LOG_FORMAT", global = true)]
    log_format: Option<String>,

    /// Print the run report as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a script of marketplace operations
    Run {
        /// Path to the script JSON file
        file: String,
    },
    /// Run the canonical request, answer and rating scenario
    Demo,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }

    init_logging(&settings.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        admin = %settings.market.admin,
        "Starting AskMarket"
    );

    match cli.command {
        Commands::Run { file } => {
            let script = Script::from_file(&file)?;
            let report = script.run(settings.market).await?;
            print_report(&report, cli.json)?;
        }
        Commands::Demo => {
            let script = Script::demo(&settings.market)?;
            let report = script.run(settings.market).await?;
            print_report(&report, cli.json)?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true).with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_report(report: &RunReport, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║                   AskMarket Run Report                   ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(value) if value.is_null() => {
                println!("✓ [{:>2}] {}", outcome.index, outcome.op);
            }
            Ok(value) => {
                println!("✓ [{:>2}] {} → {}", outcome.index, outcome.op, value);
            }
            Err(failure) => {
                println!(
                    "✗ [{:>2}] {} → {}: {}",
                    outcome.index, outcome.op, failure.code, failure.message
                );
            }
        }
    }

    println!();
    println!("Events:");
    for event in &report.events {
        println!("  [{:>4}] {}", event.timestamp(), event.summary());
    }

    println!();
    println!("Requests:        {}", report.stats.total_requests);
    println!("Fees collected:  {}", report.stats.total_fees_collected);
    println!("Custody balance: {}", report.custody_balance);
    println!("Paused:          {}", report.stats.paused);
    println!(
        "Steps:           {} ok, {} rejected",
        report.outcomes.len() - report.failures(),
        report.failures()
    );

    Ok(())
}
