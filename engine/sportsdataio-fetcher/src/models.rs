use crate::error::RefreshError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Collection holding one document per player game log
pub const GAME_LOGS_COLLECTION: &str = "gameLogs";

/// Collection holding one document per team profile
pub const TEAM_PROFILE_COLLECTION: &str = "TeamProfile";

/// Field stamped with the store clock on every game log write
pub const LAST_UPDATED_FIELD: &str = "lastUpdated";

/// True when the provider returned nothing worth storing: null, `[]` or `""`
pub fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Render a provider identifier (string or number) as a key segment
fn key_segment(value: Option<&Value>, field: &str) -> Result<String, RefreshError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(RefreshError::payload(format!("field {} has unusable value {}", field, other))),
        None => Err(RefreshError::payload(format!("missing field {}", field))),
    }
}

/// Game log document id: `{playerId}_{season}_{ShortName of the first game}`
pub fn game_log_key(player_id: &str, season: &str, games: &Value) -> Result<String, RefreshError> {
    let first = games
        .as_array()
        .and_then(|games| games.first())
        .ok_or_else(|| RefreshError::payload("game log is not a non-empty array"))?;

    let short_name = key_segment(first.get("ShortName"), "ShortName")?;
    Ok(format!("{}_{}_{}", player_id, season, short_name))
}

/// Team profile document id: `{Key}_{TeamID}`
pub fn team_profile_key(team: &Value) -> Result<String, RefreshError> {
    let key = key_segment(team.get("Key"), "Key")?;
    let team_id = key_segment(team.get("TeamID"), "TeamID")?;
    Ok(format!("{}_{}", key, team_id))
}

/// Result of a best-effort game log refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameLogRefresh {
    /// Document written under `key`
    Updated { key: String },

    /// Provider had no games for the player; nothing was written
    NoData,

    /// Fetch, shape or storage failure; nothing was written
    Failed { error: String },
}

/// Result of a team profile refresh
#[derive(Debug, Clone, PartialEq)]
pub enum TeamRefresh {
    /// `count` team profiles merged in one batch
    Updated { count: usize, teams: Value },

    /// Provider returned no teams; the store was not touched
    NoData,
}

/// Counts from one scheduled refresh pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub updated: usize,
    pub no_data: usize,
    pub failed: usize,
}

impl RefreshSummary {
    pub fn record(&mut self, outcome: &GameLogRefresh) {
        match outcome {
            GameLogRefresh::Updated { .. } => self.updated += 1,
            GameLogRefresh::NoData => self.no_data += 1,
            GameLogRefresh::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.updated + self.no_data + self.failed
    }
}

/// Events emitted by the scheduler
#[derive(Debug, Clone, Serialize)]
pub enum FetcherEvent {
    /// Daily game log pass finished
    GameLogsRefreshed {
        summary: RefreshSummary,
        timestamp: DateTime<Utc>,
    },
}
