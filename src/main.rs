//! sheetdash main entry point

use clap::Parser;
use sheetdash_api::start_server;
use sheetdash_config::{Config, ConfigError};
use sheetdash_core::Dashboard;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "sheetdash")]
#[command(author = "sheetdash contributors")]
#[command(version = "0.1.0")]
#[command(about = "Income and expense dashboard for a spreadsheet-backed ledger", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Write a default configuration file to --config and exit
    #[arg(long)]
    init: bool,

    /// Fetch once, print the summary and exit instead of serving
    #[arg(long)]
    print: bool,

    /// Months to show with --print (defaults to dashboard.default_range)
    #[arg(long)]
    range: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.init {
        if args.config.exists() {
            return Err(format!("{} already exists", args.config.display()).into());
        }
        std::fs::write(&args.config, Config::generate_default())?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e.into());
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if missing {
        log::warn!(
            "Config file {} not found, using defaults (run with --init to create one)",
            args.config.display()
        );
    }
    log::info!(
        "Config loaded: source={}, default_range={}",
        if config.is_demo() { "demo data" } else { config.source.endpoint.as_str() },
        config.dashboard.default_range
    );

    let rt = Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::from_config(config.clone())?;

    if args.print {
        dashboard.ensure_loaded().await?;
        let range = dashboard.parse_range(args.range.as_deref());
        let view = dashboard.render(range)?;
        println!("Income:   {}", view.totals.income);
        println!("Expenses: {}", view.totals.expense);
        println!("Balance:  {}", view.totals.balance);
        println!();
        for (label, value) in view.window.labels.iter().zip(&view.window.values) {
            println!("{}  {:>16}", label, view.format_amount(*value));
        }
        return Ok(());
    }

    // Warm the cache; a failure here leaves the first request to retry.
    if let Err(e) = dashboard.load().await {
        log::warn!("Initial fetch failed: {}", e);
    }

    start_server(config, Arc::new(RwLock::new(dashboard))).await?;
    Ok(())
}
