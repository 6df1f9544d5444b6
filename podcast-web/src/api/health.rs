//! `/health`: liveness plus a count of what is currently generated

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPages {
    pub home: bool,
    pub episodes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub cached_pages: CachedPages,
    pub player_sessions: usize,
}

/// GET /health
///
/// Never touches the episode source, so it answers while the API is down.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let cached_pages = CachedPages {
        home: !state.pages.home_cache().is_empty().await,
        episodes: state.pages.episode_cache().len().await,
    };

    Json(HealthReport {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        cached_pages,
        player_sessions: state.sessions.len().await,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
