pub mod analysis;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod models;

use crate::config::Settings;
use crate::fetcher::fred::FredFetcher;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, honouring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Build a FRED client from settings.
pub fn fred_fetcher(settings: &Settings) -> FredFetcher {
    let fetcher = FredFetcher::new(settings.fred_api_key.clone()).with_throttle(settings.throttle);
    match &settings.fred_base_url {
        Some(url) => fetcher.with_base_url(url.clone()),
        None => fetcher,
    }
}

/// Generate the dashboard once against FRED and exit.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::from_env();
    let fetcher = fred_fetcher(&settings);

    if !fetcher.has_api_key() {
        tracing::info!("No FRED_API_KEY set; using the public fredgraph.csv endpoint");
    }

    crate::core::orchestrator::generate(&fetcher, &settings, chrono::Utc::now()).await?;
    Ok(())
}
