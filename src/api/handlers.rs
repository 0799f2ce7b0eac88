//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, InfoQuery, StateResponse};
use crate::env::types::StepInfo;

/// Returns scenario config, episode summaries, and the latest step record.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse {
        config: state.config.clone(),
        summaries: state.summaries.clone(),
        latest_step: state.records.last().cloned(),
    })
}

/// Returns step records, optionally filtered by step range and episode.
///
/// `GET /info` → 200 + `Vec<StepInfo>` JSON
/// `GET /info?from=N&to=M` → filtered range (inclusive)
/// `GET /info?episode=E` → one episode
/// `GET /info?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InfoQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<StepInfo> = state
        .records
        .iter()
        .filter(|r| r.step >= from && r.step <= to)
        .filter(|r| query.episode.is_none_or(|e| r.episode == e))
        .cloned()
        .collect();

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::ScenarioConfig;
    use crate::env::summary::EpisodeSummary;
    use crate::env::types::fixtures::step_info;

    fn make_test_state() -> Arc<AppState> {
        let records: Vec<StepInfo> = (0..24).map(step_info).collect();
        let summaries = vec![EpisodeSummary::from_records(&records, 4.0)];
        Arc::new(AppState {
            config: ScenarioConfig::baseline(),
            summaries,
            records,
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn state_returns_200() {
        let (status, json) = get_json("/state").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.get("config").is_some());
        assert_eq!(json["summaries"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["latest_step"]["step"], 23);
    }

    #[tokio::test]
    async fn info_returns_all_steps() {
        let (status, json) = get_json("/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(24));
    }

    #[tokio::test]
    async fn info_range_query() {
        let (status, json) = get_json("/info?from=5&to=10").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 6); // steps 5,6,7,8,9,10
        assert_eq!(rows[0]["step"], 5);
        assert_eq!(rows[5]["step"], 10);
    }

    #[tokio::test]
    async fn info_episode_filter() {
        let (_, json) = get_json("/info?episode=3").await;
        assert_eq!(json.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn info_invalid_range_returns_400() {
        let (status, json) = get_json("/info?from=10&to=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }
}
