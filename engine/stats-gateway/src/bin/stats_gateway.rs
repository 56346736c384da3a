//! StatsGateway server

use anyhow::Context;
use document_store::{DocumentStore, StoreConfig};
use sportsdataio_fetcher::{FetcherConfig, RefreshPipeline, RefreshScheduler, SportsDataIOFetcher};
use stats_gateway::logging::initialize_logging;
use stats_gateway::{rest_api, GatewayConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let gateway_config = GatewayConfig::from_env()?;
    initialize_logging(&gateway_config.logging)?;

    info!("Starting StatsGateway...");

    let fetcher_config = FetcherConfig::from_env()?;
    info!("Loaded configuration: {:?}", fetcher_config);

    let store_config = StoreConfig::from_env()?;
    let store = document_store::connect(&store_config)
        .await
        .context("Failed to open document store")?;
    info!("Connected to {} document store", store.name());

    let fetcher = SportsDataIOFetcher::new(fetcher_config.timeout())?;
    let pipeline = Arc::new(RefreshPipeline::new(&fetcher_config, Arc::new(fetcher), store));

    if fetcher_config.scheduler.enabled && !fetcher_config.scheduler.player_ids.is_empty() {
        RefreshScheduler::new(pipeline.clone(), fetcher_config.scheduler.clone()).spawn();
    }

    let routes = rest_api::create_routes(pipeline);
    let addr = gateway_config.server.socket_addr()?;
    info!("Starting StatsGateway on {}", addr);

    warp::serve(routes).run(addr).await;

    Ok(())
}
