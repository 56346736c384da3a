use anyhow::{bail, Context};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration for the SportsDataIO fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// SportsDataIO API configuration
    pub sportsdataio: SportsDataIOConfig,

    /// Scheduled refresh configuration
    pub scheduler: SchedulerConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SportsDataIOConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,

    /// Stats API base, e.g. https://api.sportsdata.io/v3/nfl/stats/json
    pub base_url: String,

    /// Fixed season used for game logs (e.g., "2024")
    pub season: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

// Keeps the key out of "Loaded configuration" log lines
impl fmt::Debug for SportsDataIOConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SportsDataIOConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("season", &self.season)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Run the daily game log refresh
    pub enabled: bool,

    /// Daily refresh time (HH:MM format, UTC)
    pub refresh_time_utc: String,

    /// Players whose game logs are refreshed each day
    pub player_ids: Vec<String>,
}

impl SchedulerConfig {
    pub fn refresh_time(&self) -> anyhow::Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.refresh_time_utc, "%H:%M")
            .with_context(|| format!("Invalid refresh time '{}', expected HH:MM", self.refresh_time_utc))
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            sportsdataio: SportsDataIOConfig {
                api_key: String::new(),
                base_url: "https://api.sportsdata.io/v3/nfl/stats/json".to_string(),
                season: "2024".to_string(),
                timeout_secs: 5,
            },
            scheduler: SchedulerConfig {
                enabled: true,
                refresh_time_utc: "03:00".to_string(),
                player_ids: Vec::new(),
            },
        }
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        match lookup("SPORTSDATA_API_KEY") {
            Some(key) if !key.trim().is_empty() => config.sportsdataio.api_key = key,
            _ => bail!("SPORTSDATA_API_KEY not found in environment"),
        }

        if let Some(base_url) = lookup("SPORTSDATAIO_BASE_URL") {
            config.sportsdataio.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(season) = lookup("SPORTSDATAIO_SEASON") {
            config.sportsdataio.season = season;
        }

        if let Some(timeout) = lookup("SPORTSDATAIO_TIMEOUT_SECS") {
            config.sportsdataio.timeout_secs = timeout
                .parse()
                .with_context(|| format!("SPORTSDATAIO_TIMEOUT_SECS must be a number, got '{}'", timeout))?;
        }

        if let Some(enabled) = lookup("REFRESH_ENABLED") {
            config.scheduler.enabled = enabled
                .parse()
                .with_context(|| format!("REFRESH_ENABLED must be true or false, got '{}'", enabled))?;
        }

        if let Some(time) = lookup("REFRESH_TIME_UTC") {
            config.scheduler.refresh_time_utc = time;
        }
        config.scheduler.refresh_time()?;

        if let Some(ids) = lookup("REFRESH_PLAYER_IDS") {
            config.scheduler.player_ids = ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    /// Provider request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.sportsdataio.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_api_key_is_required() {
        assert!(FetcherConfig::from_lookup(lookup(&[])).is_err());
        assert!(FetcherConfig::from_lookup(lookup(&[("SPORTSDATA_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = FetcherConfig::from_lookup(lookup(&[("SPORTSDATA_API_KEY", "k")])).unwrap();
        assert_eq!(config.sportsdataio.season, "2024");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.sportsdataio.base_url, "https://api.sportsdata.io/v3/nfl/stats/json");
        assert_eq!(config.scheduler.refresh_time().unwrap(), NaiveTime::from_hms_opt(3, 0, 0).unwrap());
        assert!(config.scheduler.player_ids.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = FetcherConfig::from_lookup(lookup(&[
            ("SPORTSDATA_API_KEY", "k"),
            ("SPORTSDATAIO_BASE_URL", "http://localhost:9000/nfl/"),
            ("SPORTSDATAIO_SEASON", "2023"),
            ("SPORTSDATAIO_TIMEOUT_SECS", "2"),
            ("REFRESH_ENABLED", "false"),
            ("REFRESH_TIME_UTC", "07:30"),
            ("REFRESH_PLAYER_IDS", "19801, 21682,,"),
        ]))
        .unwrap();

        assert_eq!(config.sportsdataio.base_url, "http://localhost:9000/nfl");
        assert_eq!(config.sportsdataio.season, "2023");
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert!(!config.scheduler.enabled);
        assert_eq!(config.scheduler.player_ids, vec!["19801", "21682"]);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let with_key = |extra: (&'static str, &'static str)| {
            FetcherConfig::from_lookup(lookup(&[("SPORTSDATA_API_KEY", "k"), extra]))
        };
        assert!(with_key(("SPORTSDATAIO_TIMEOUT_SECS", "soon")).is_err());
        assert!(with_key(("REFRESH_TIME_UTC", "3am")).is_err());
        assert!(with_key(("REFRESH_ENABLED", "yes")).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config =
            FetcherConfig::from_lookup(lookup(&[("SPORTSDATA_API_KEY", "super-secret")])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
