//! LeaguemateMirror - Main Entry Point
//!
//! Runs one mirror scan for a Sleeper username and prints each mirror
//! trade as it is found.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use leaguemate_mirror::common::traits::event_channel;
use leaguemate_mirror::common::types::{sorted_for_display, ManagerMoves};
use leaguemate_mirror::config::load_config;
use leaguemate_mirror::report::csv::{export_to_path, format_move};
use leaguemate_mirror::{MirrorScanner, MirrorTrade, ScanEvent, ScanMetric};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sleeper username to scan for
    #[arg(env = "SLEEPER_USERNAME")]
    username: String,

    /// Only consider trades from the last N days (1-30)
    #[arg(short = 'd', long)]
    lookback_days: Option<u32>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level or filter directives (e.g. `debug`, `leaguemate_mirror=trace`)
    #[arg(long)]
    log_level: Option<String>,

    /// Write the results as CSV to this path
    #[arg(long)]
    csv: Option<String>,

    /// Also tag draft picks against pick ownership
    #[arg(long)]
    correlate_picks: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config))?;
    if let Some(level) = &args.log_level {
        config.settings.log_level = level.clone();
    }
    if args.correlate_picks {
        config.settings.correlate_picks = true;
    }

    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log_filter(&config.settings.log_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting LeaguemateMirror");
    info!("Configuration file: {}", args.config);

    let lookback_days = args.lookback_days.unwrap_or(config.settings.lookback_days);
    let mut scanner = MirrorScanner::new(&config)?;

    let (mut tx, mut rx) = event_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ScanEvent::Progress(p) => info!("[{:>3.0}%] {}", p.fraction * 100.0, p.label),
                ScanEvent::Metric(ScanMetric::Leaguemates(n)) => info!("Leaguemates: {}", n),
                ScanEvent::Metric(ScanMetric::LeaguesScanned(n)) => info!("Total scanned: {}", n),
                ScanEvent::MirrorTrade(trade) => print_trade(&trade),
                ScanEvent::Finished(summary) => info!(
                    "Mirrors found: {} | Time: {:.1}s",
                    summary.opportunities,
                    summary.elapsed.as_secs_f64()
                ),
                _ => {}
            }
        }
    });

    let outcome = scanner.scan(&args.username, lookback_days, &mut tx).await;
    drop(tx);
    printer.await?;
    outcome.with_context(|| format!("Scan for {} failed", args.username))?;

    if let Some(path) = &args.csv {
        let sorted = sorted_for_display(scanner.results());
        export_to_path(path, &sorted)?;
        info!("Wrote {} mirror trades to {}", sorted.len(), path);
    }

    Ok(())
}

/// Filter from a level (`info`) or directives (`leaguemate_mirror=debug`)
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::new(level.trim().to_lowercase())
}

fn print_trade(trade: &MirrorTrade) {
    println!("\n{} - {}", trade.league_name, trade.time);
    for manager in &trade.managers {
        print_manager(manager);
    }
}

fn print_manager(manager: &ManagerMoves) {
    println!("  {}", manager.manager_name);
    for item in &manager.adds {
        println!("    {}", format_move('+', item));
    }
    for item in &manager.drops {
        println!("    {}", format_move('-', item));
    }
}
