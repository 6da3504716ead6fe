use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use radar_client::HttpAnalysisClient;
use radar_core::{AnalysisBackend, RadarError};
use radar_dashboard::{DashboardViewModel, ForecastPanel};

mod config;
mod render;

use config::RadarConfig;

#[derive(Parser, Debug)]
#[command(name = "radar", about = "Stock Radar: batch screening, single-ticker analysis and forecasts")]
struct Cli {
    /// Analysis API base URL (overrides RADAR_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print the final dashboard snapshot as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a batch analysis job and follow it to completion
    Batch {
        #[arg(long)]
        top_n: Option<u32>,
        /// Status poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Ticker to show details for once the job completes
        #[arg(long)]
        select: Option<String>,
    },
    /// Analyze one ticker without a batch job
    Single { ticker: String },
    /// Analyze one ticker and print its 100-day forecast
    Forecast { ticker: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let cli = Cli::parse();

    let interval = match &cli.command {
        Command::Batch { interval_ms, .. } => *interval_ms,
        _ => None,
    };
    let config = RadarConfig::from_env()?
        .with_api_url(cli.api_url.clone())
        .with_poll_interval(interval);

    let client = HttpAnalysisClient::new(config.client.clone());
    tracing::info!("Using analysis API at {}", client.base_url());
    let vm = DashboardViewModel::new(Arc::new(client), config.controller.clone());

    let outcome = match cli.command {
        Command::Batch { top_n, select, .. } => {
            run_batch(&vm, top_n.unwrap_or(config.top_n), select.as_deref()).await
        }
        Command::Single { ticker } => run_single(&vm, &ticker, false).await,
        Command::Forecast { ticker } => run_single(&vm, &ticker, true).await,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&vm.snapshot())?);
    }
    vm.controller().shutdown().await;
    outcome
}

async fn run_batch<B: AnalysisBackend + 'static>(
    vm: &DashboardViewModel<B>,
    top_n: u32,
    select: Option<&str>,
) -> Result<()> {
    let mut updates = vm.subscribe();
    vm.run_batch(top_n).await?;
    tracing::info!("Batch analysis started for top {} candidates", top_n);

    let mut last_progress = None;
    loop {
        let snapshot = updates.borrow_and_update().clone();
        if !snapshot.is_running() {
            break;
        }
        if last_progress != Some(snapshot.progress) {
            last_progress = Some(snapshot.progress);
            eprintln!("{}", render::header(&vm.header()));
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, stopping status polling");
                vm.reset().await;
                return Ok(());
            }
        }
    }

    let snapshot = vm.snapshot();
    println!("{}", render::phase_summary(snapshot.phase, snapshot.progress));
    if let Some(ticker) = select {
        if let Err(e) = vm.select(ticker).await {
            tracing::warn!("Cannot select {}: {}", ticker, e);
        }
    }
    print_dashboard(vm, true).await;
    Ok(())
}

async fn run_single<B: AnalysisBackend + 'static>(
    vm: &DashboardViewModel<B>,
    ticker: &str,
    with_forecast: bool,
) -> Result<()> {
    if let Err(e) = vm.run_single(ticker).await {
        return Err(single_failure(e));
    }
    print_dashboard(vm, with_forecast).await;
    Ok(())
}

/// Error reported once at exit, carrying the message the dashboard would show.
fn single_failure(e: RadarError) -> anyhow::Error {
    anyhow!(e.display_message())
}

async fn print_dashboard<B: AnalysisBackend + 'static>(vm: &DashboardViewModel<B>, with_forecast: bool) {
    let header = vm.header();
    println!("{}", render::header(&header));
    print!("{}", render::candidates(&header, &vm.candidate_rows()));
    print!("{}", render::score_profile(vm.score_profile().as_ref()));

    if with_forecast {
        let panel = vm.load_forecast().await;
        if matches!(panel, ForecastPanel::NoSelection) {
            return;
        }
        print!("{}", render::forecast(&panel));
    }
}
