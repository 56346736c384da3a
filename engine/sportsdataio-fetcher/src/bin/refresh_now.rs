//! One-off refresh: team profiles for a season and game logs for a list of players

use anyhow::Context;
use clap::Parser;
use document_store::StoreConfig;
use sportsdataio_fetcher::{
    FetcherConfig, GameLogRefresh, RefreshPipeline, RefreshSummary, SportsDataIOFetcher, TeamRefresh,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "refresh-now", about = "Refresh stored SportsDataIO data immediately")]
struct Args {
    /// Season for the team profile refresh (defaults to the configured season)
    #[arg(long)]
    season: Option<String>,

    /// Player id to refresh; repeatable. Defaults to REFRESH_PLAYER_IDS.
    #[arg(long = "player")]
    players: Vec<String>,

    /// Skip the team profile refresh
    #[arg(long)]
    skip_teams: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = FetcherConfig::from_env()?;

    let store = document_store::connect(&StoreConfig::from_env()?)
        .await
        .context("Failed to open document store")?;
    let fetcher = SportsDataIOFetcher::new(config.timeout())?;
    let pipeline = RefreshPipeline::new(&config, Arc::new(fetcher), store);

    if !args.skip_teams {
        let season = args.season.as_deref().unwrap_or(pipeline.season());
        match pipeline.refresh_team_profiles(season).await.context("Team profile refresh failed")? {
            TeamRefresh::Updated { count, .. } => info!("Merged {} team profiles for {}", count, season),
            TeamRefresh::NoData => warn!("No team data available for {}", season),
        }
    }

    let players = if args.players.is_empty() { config.scheduler.player_ids.clone() } else { args.players };

    let mut summary = RefreshSummary::default();
    for player_id in &players {
        let outcome = pipeline.refresh_player_game_log(player_id).await;
        if let GameLogRefresh::Updated { key } = &outcome {
            info!("Stored game log {}", key);
        }
        summary.record(&outcome);
    }

    info!("Game log refresh finished: {:?}", summary);
    Ok(())
}
