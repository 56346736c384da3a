//! REST API endpoints for the StatsGateway
//!
//! Every endpoint is a GET with query parameters and a JSON body. Handlers only
//! validate parameters, call the refresh pipeline and map the outcome to a status.

use crate::error::{handle_rejection, ApiError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sportsdataio_fetcher::{GameLogRefresh, RefreshPipeline, TeamRefresh};
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// `getPlayerGameLog` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PlayerGameLogParams {
    #[serde(rename = "playerId")]
    pub player_id: Option<String>,
    pub season: Option<String>,
}

/// `updateGameLogs` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGameLogsParams {
    #[serde(rename = "playerId")]
    pub player_id: Option<String>,
}

/// `getNFLTeamProfilesbySeason` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TeamProfilesParams {
    pub season: Option<String>,
}

/// Team refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamProfilesResponse {
    pub message: String,
    #[serde(rename = "updatedCount", skip_serializing_if = "Option::is_none")]
    pub updated_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Value>,
}

/// Empty strings count as missing
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Live game log for a player, not cached
pub async fn get_player_game_log(
    params: PlayerGameLogParams,
    pipeline: Arc<RefreshPipeline>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (player_id, season) = match (present(&params.player_id), present(&params.season)) {
        (Some(player_id), Some(season)) => (player_id, season),
        _ => return Err(warp::reject::custom(ApiError::validation("Missing playerId or season"))),
    };

    // The season parameter is required but the provider call always uses the fixed season
    if season != pipeline.season() {
        tracing::debug!(
            "Season {} requested for player {}, serving fixed season {}",
            season,
            player_id,
            pipeline.season()
        );
    }

    match pipeline.player_game_log(player_id).await {
        Ok(data) => Ok(warp::reply::json(&data)),
        Err(e) => {
            tracing::error!("Error fetching game log for {}: {}", player_id, e);
            Err(warp::reject::custom(ApiError::Internal))
        }
    }
}

/// Refresh a player's stored game log. The refresh is best effort: once the
/// parameters are valid the request is acknowledged and the outcome only logged.
pub async fn update_game_logs(
    params: UpdateGameLogsParams,
    pipeline: Arc<RefreshPipeline>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let player_id = present(&params.player_id)
        .ok_or_else(|| warp::reject::custom(ApiError::validation("Missing playerId")))?;

    tracing::info!("Updating player game logs...");
    match pipeline.refresh_player_game_log(player_id).await {
        GameLogRefresh::Updated { key } => tracing::info!("Game log updates completed: {}", key),
        GameLogRefresh::NoData => tracing::info!("Game log update for {} found no data", player_id),
        GameLogRefresh::Failed { error } => {
            tracing::warn!("Game log update for {} failed: {}", player_id, error)
        }
    }

    Ok(warp::reply::json(&format!("Updated game log for player: {}", player_id)))
}

/// Merge every team profile of a season into the store
pub async fn get_nfl_team_profiles_by_season(
    params: TeamProfilesParams,
    pipeline: Arc<RefreshPipeline>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let season = present(&params.season)
        .ok_or_else(|| warp::reject::custom(ApiError::validation("Missing season parameter")))?;

    tracing::info!("Fetching NFL team profiles for season {}...", season);
    let response = match pipeline.refresh_team_profiles(season).await {
        Ok(TeamRefresh::Updated { count, teams }) => TeamProfilesResponse {
            message: "Updated NFL Team Profile Information.".to_string(),
            updated_count: Some(count),
            teams: Some(teams),
        },
        Ok(TeamRefresh::NoData) => TeamProfilesResponse {
            message: "No team data available".to_string(),
            updated_count: None,
            teams: None,
        },
        Err(e) => {
            tracing::error!("Error fetching or updating teams: {}", e);
            return Err(warp::reject::custom(ApiError::Internal));
        }
    };

    Ok(warp::reply::json(&response))
}

fn with_pipeline(
    pipeline: Arc<RefreshPipeline>,
) -> impl Filter<Extract = (Arc<RefreshPipeline>,), Error = Infallible> + Clone {
    warp::any().map(move || pipeline.clone())
}

fn health() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    })
}

/// Routes mounted under `/api`
pub fn api_routes() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("api").and(health())
}

/// Create all routes
pub fn create_routes(
    pipeline: Arc<RefreshPipeline>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let player_game_log = warp::path("getPlayerGameLog")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<PlayerGameLogParams>())
        .and(with_pipeline(pipeline.clone()))
        .and_then(get_player_game_log);

    let update_game_logs = warp::path("updateGameLogs")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<UpdateGameLogsParams>())
        .and(with_pipeline(pipeline.clone()))
        .and_then(update_game_logs);

    let team_profiles = warp::path("getNFLTeamProfilesbySeason")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<TeamProfilesParams>())
        .and(with_pipeline(pipeline))
        .and_then(get_nfl_team_profiles_by_season);

    player_game_log
        .or(update_game_logs)
        .or(team_profiles)
        .or(api_routes())
        .or(health())
        .recover(handle_rejection)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "OPTIONS"]),
        )
        .with(warp::trace::request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::{DocumentPath, DocumentStore, MemoryStore, StoreStats};
    use serde_json::json;
    use sportsdataio_fetcher::testing::StubProvider;
    use sportsdataio_fetcher::{FetcherConfig, GAME_LOGS_COLLECTION, TEAM_PROFILE_COLLECTION};
    use warp::http::StatusCode;

    struct Harness {
        provider: Arc<StubProvider>,
        store: Arc<MemoryStore>,
        pipeline: Arc<RefreshPipeline>,
    }

    fn harness(provider: StubProvider) -> Harness {
        let mut config = FetcherConfig::default();
        config.sportsdataio.api_key = "test-key".to_string();
        config.sportsdataio.base_url = "http://provider".to_string();

        let provider = Arc::new(provider);
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(RefreshPipeline::new(&config, provider.clone(), store.clone()));
        Harness { provider, store, pipeline }
    }

    async fn get(harness: &Harness, path: &str) -> (StatusCode, Value) {
        let routes = create_routes(harness.pipeline.clone());
        let res = warp::test::request().method("GET").path(path).reply(&routes).await;
        let body = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
        (res.status(), body)
    }

    fn games() -> Value {
        json!([{ "ShortName": "KC @ BAL", "Week": 1 }, { "ShortName": "CIN @ KC", "Week": 2 }])
    }

    #[tokio::test]
    async fn test_missing_parameters_are_400() {
        let h = harness(StubProvider::new());

        for path in [
            "/getPlayerGameLog",
            "/getPlayerGameLog?playerId=P1",
            "/getPlayerGameLog?season=2024",
            "/getPlayerGameLog?playerId=&season=2024",
        ] {
            let (status, body) = get(&h, path).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(body, json!({ "error": "Missing playerId or season" }));
        }

        for path in ["/updateGameLogs", "/updateGameLogs?playerId=", "/updateGameLogs?season=2024"] {
            let (status, body) = get(&h, path).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(body, json!({ "error": "Missing playerId" }));
        }

        for path in ["/getNFLTeamProfilesbySeason", "/getNFLTeamProfilesbySeason?season="] {
            let (status, body) = get(&h, path).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(body, json!({ "error": "Missing season parameter" }));
        }

        assert!(h.provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_player_game_log_passes_payload_through() {
        let h = harness(StubProvider::new().respond("PlayerGameStatsBySeason", games()));

        let (status, body) = get(&h, "/getPlayerGameLog?playerId=P1&season=2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, games());
        assert_eq!(h.store.stats(), StoreStats::default());
    }

    #[tokio::test]
    async fn test_player_game_log_empty_is_not_special_cased() {
        let h = harness(StubProvider::new().respond("PlayerGameStatsBySeason", json!([])));

        let (status, body) = get(&h, "/getPlayerGameLog?playerId=P1&season=2023").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_player_game_log_ignores_season_parameter() {
        let h = harness(StubProvider::new().respond("PlayerGameStatsBySeason", games()));

        get(&h, "/getPlayerGameLog?playerId=P1&season=2019").await;
        assert_eq!(
            h.provider.requests(),
            vec!["http://provider/PlayerGameStatsBySeason/2024/P1/all?key=test-key"]
        );
    }

    #[tokio::test]
    async fn test_player_game_log_fetch_failure_is_generic_500() {
        let h = harness(StubProvider::new().fail("PlayerGameStatsBySeason"));

        let (status, body) = get(&h, "/getPlayerGameLog?playerId=P1&season=2024").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn test_update_game_logs_stores_document() {
        let h = harness(StubProvider::new().respond("PlayerGameStatsBySeason", games()));

        let (status, body) = get(&h, "/updateGameLogs?playerId=19801").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("Updated game log for player: 19801"));

        let doc = h
            .store
            .get(&DocumentPath::new(GAME_LOGS_COLLECTION, "19801_2024_KC @ BAL"))
            .await
            .unwrap();
        assert!(doc.is_some());
    }

    #[tokio::test]
    async fn test_update_game_logs_acknowledges_failures() {
        let h = harness(StubProvider::new().fail("PlayerGameStatsBySeason"));

        let (status, body) = get(&h, "/updateGameLogs?playerId=19801").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("Updated game log for player: 19801"));
        assert_eq!(h.store.stats(), StoreStats::default());
    }

    #[tokio::test]
    async fn test_team_profiles_are_merged() {
        let teams = json!([
            { "Key": "ARI", "TeamID": 1, "City": "Arizona" },
            { "Key": "ATL", "TeamID": 2, "City": "Atlanta" }
        ]);
        let h = harness(StubProvider::new().respond("/Teams/2024", teams.clone()));

        let (status, body) = get(&h, "/getNFLTeamProfilesbySeason?season=2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message": "Updated NFL Team Profile Information.",
                "updatedCount": 2,
                "teams": teams
            })
        );
        assert_eq!(h.store.ids(TEAM_PROFILE_COLLECTION), vec!["ARI_1", "ATL_2"]);
        assert_eq!(h.store.stats().batch_commits, 1);
    }

    #[tokio::test]
    async fn test_team_profiles_no_data() {
        let h = harness(StubProvider::new().respond("/Teams/", json!([])));

        let (status, body) = get(&h, "/getNFLTeamProfilesbySeason?season=2030").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "No team data available" }));
        assert_eq!(h.store.stats().batch_commits, 0);
    }

    #[tokio::test]
    async fn test_team_profiles_failure_is_500() {
        let h = harness(StubProvider::new().fail("/Teams/"));

        let (status, body) = get(&h, "/getNFLTeamProfilesbySeason?season=2024").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn test_health_and_api_mount() {
        let h = harness(StubProvider::new());

        let (status, body) = get(&h, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = get(&h, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = get(&h, "/api/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Not Found" }));
    }
}
