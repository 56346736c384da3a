use crate::config::SchedulerConfig;
use crate::models::{FetcherEvent, RefreshSummary};
use crate::pipeline::RefreshPipeline;
use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

/// Runs the game log refresh for the configured players once a day
pub struct RefreshScheduler {
    pipeline: Arc<RefreshPipeline>,
    config: SchedulerConfig,
}

impl RefreshScheduler {
    pub fn new(pipeline: Arc<RefreshPipeline>, config: SchedulerConfig) -> Self {
        Self { pipeline, config }
    }

    /// Start the daily loop on the runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.start().await {
                warn!("Game log scheduler stopped: {}", e);
            }
        })
    }

    /// Run the daily loop (runs indefinitely)
    pub async fn start(&self) -> Result<()> {
        let refresh_time = self.config.refresh_time()?;
        info!(
            "Starting game log scheduler for {} players at {} UTC",
            self.config.player_ids.len(),
            refresh_time.format("%H:%M")
        );

        loop {
            let next_run = Self::calculate_next_run(refresh_time, Utc::now());
            let sleep_duration = (next_run - Utc::now()).to_std().unwrap_or(Duration::from_secs(60));

            info!("Next game log refresh scheduled for: {}", next_run);
            sleep(sleep_duration).await;

            let event = self.run_once().await;
            info!("Game log refresh completed: {:?}", event);
        }
    }

    /// Refresh every configured player one after another. Failures are counted,
    /// never retried.
    pub async fn run_once(&self) -> FetcherEvent {
        let mut summary = RefreshSummary::default();

        for player_id in &self.config.player_ids {
            let outcome = self.pipeline.refresh_player_game_log(player_id).await;
            summary.record(&outcome);
        }

        if summary.failed > 0 {
            warn!("{} of {} game log refreshes failed", summary.failed, summary.total());
        }

        FetcherEvent::GameLogsRefreshed { summary, timestamp: Utc::now() }
    }

    /// Next occurrence of `refresh_time` strictly after `now`
    pub fn calculate_next_run(refresh_time: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(refresh_time).and_utc();

        if today > now {
            today
        } else {
            (now.date_naive() + ChronoDuration::days(1)).and_time(refresh_time).and_utc()
        }
    }
}
