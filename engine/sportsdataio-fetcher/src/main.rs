use anyhow::Context;
use document_store::StoreConfig;
use sportsdataio_fetcher::{FetcherConfig, RefreshPipeline, RefreshScheduler, SportsDataIOFetcher};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    info!("Starting SportsDataIO game log scheduler");

    let config = FetcherConfig::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let store = document_store::connect(&StoreConfig::from_env()?)
        .await
        .context("Failed to open document store")?;
    let fetcher = SportsDataIOFetcher::new(config.timeout())?;
    let pipeline = Arc::new(RefreshPipeline::new(&config, Arc::new(fetcher), store));

    // Runs indefinitely
    RefreshScheduler::new(pipeline, config.scheduler.clone()).start().await
}
