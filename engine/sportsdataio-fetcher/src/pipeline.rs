//! Fetch-and-upsert pipeline
//!
//! Every operation is one independent run of fetch -> validate -> (store).
//! Storage is only touched once the provider response has been checked, so a
//! failed or empty fetch never leaves a partial document behind.

use crate::config::FetcherConfig;
use crate::error::{FetchError, RefreshError};
use crate::fetcher::{ProviderUrls, StatsProvider};
use crate::models::*;
use document_store::{Document, DocumentPath, DocumentStore, DocumentWrite, WriteBatch};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct RefreshPipeline {
    urls: ProviderUrls,
    season: String,
    provider: Arc<dyn StatsProvider>,
    store: Arc<dyn DocumentStore>,
}

impl RefreshPipeline {
    pub fn new(
        config: &FetcherConfig,
        provider: Arc<dyn StatsProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            urls: ProviderUrls::new(&config.sportsdataio.base_url, &config.sportsdataio.api_key),
            season: config.sportsdataio.season.clone(),
            provider,
            store,
        }
    }

    /// The fixed season used for game logs
    pub fn season(&self) -> &str {
        &self.season
    }

    /// Live game log for a player, straight from the provider and never stored.
    /// Always uses the fixed season.
    pub async fn player_game_log(&self, player_id: &str) -> Result<Value, FetchError> {
        let url = self.urls.player_game_stats_by_season(&self.season, player_id);
        self.provider.fetch(&url).await
    }

    /// Refresh a player's game log document. Never fails: the outcome says what
    /// happened and the caller decides whether to surface it.
    pub async fn refresh_player_game_log(&self, player_id: &str) -> GameLogRefresh {
        match self.try_refresh_player_game_log(player_id).await {
            Ok(Some(key)) => {
                info!("Updated game log for player {}", player_id);
                GameLogRefresh::Updated { key }
            }
            Ok(None) => {
                info!("No game log data found for player {}", player_id);
                GameLogRefresh::NoData
            }
            Err(e) => {
                error!("Error updating game log for {}: {}", player_id, e);
                GameLogRefresh::Failed { error: e.to_string() }
            }
        }
    }

    async fn try_refresh_player_game_log(&self, player_id: &str) -> Result<Option<String>, RefreshError> {
        let data = self.player_game_log(player_id).await?;
        if is_empty_payload(&data) {
            return Ok(None);
        }

        let key = game_log_key(player_id, &self.season, &data)?;

        let mut doc = Document::new();
        doc.insert("data".to_string(), data);
        let write = DocumentWrite::replace(DocumentPath::new(GAME_LOGS_COLLECTION, key.clone()), doc)
            .with_server_timestamp(LAST_UPDATED_FIELD);

        self.store.set(write).await?;
        Ok(Some(key))
    }

    /// Merge every team of `season` into the store in one atomic batch
    pub async fn refresh_team_profiles(&self, season: &str) -> Result<TeamRefresh, RefreshError> {
        let url = self.urls.teams(season);
        let teams = self.provider.fetch(&url).await?;

        if is_empty_payload(&teams) {
            info!("No team data found for season {}", season);
            return Ok(TeamRefresh::NoData);
        }

        let batch = Self::stage_team_profiles(&teams)?;
        let count = self.store.commit(batch).await?;

        info!("Merged {} team profiles for season {} into {}", count, season, self.store.name());
        Ok(TeamRefresh::Updated { count, teams })
    }

    /// Stage one merge write per team; any malformed team fails the whole batch
    fn stage_team_profiles(teams: &Value) -> Result<WriteBatch, RefreshError> {
        let teams = teams.as_array().ok_or_else(|| {
            warn!("Teams payload is not an array");
            RefreshError::payload("teams payload is not an array")
        })?;

        let mut batch = WriteBatch::new();
        for team in teams {
            let key = team_profile_key(team)?;
            let fields = match team {
                Value::Object(fields) => fields.clone(),
                other => return Err(RefreshError::payload(format!("team record is not an object: {}", other))),
            };
            batch.set(DocumentWrite::merge(DocumentPath::new(TEAM_PROFILE_COLLECTION, key), fields));
        }

        Ok(batch)
    }
}
