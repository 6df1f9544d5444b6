//! Page routes and their props
//!
//! HTML and JSON variants read the same page caches.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use podcast_common::Error;

use super::error::{ApiError, PageError};
use crate::pages::{EpisodePage, HomePage};
use crate::{views, AppState};

const PLAYER_JS: &str = include_str!("../../ui/player.js");

/// GET /
pub async fn serve_home(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let page = state.pages.home().await?;
    Ok(Html(views::home(&page)))
}

/// GET /episodes/:id
pub async fn serve_episode(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    match state.pages.episode(&id).await? {
        Some(page) => Ok(Html(views::episode(&page)).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Html(views::not_found(&format!("Episode {}", id))))
            .into_response()),
    }
}

/// GET /api/pages/home
pub async fn home_props(State(state): State<AppState>) -> Result<Json<HomePage>, ApiError> {
    let page = state.pages.home().await?;
    Ok(Json(HomePage::clone(&page)))
}

/// GET /api/pages/episodes/:id
pub async fn episode_props(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EpisodePage>, ApiError> {
    let page = state
        .pages
        .episode(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Episode {}", id)))?;
    Ok(Json(EpisodePage::clone(&page)))
}

/// GET /static/player.js
pub async fn serve_player_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        PLAYER_JS,
    )
        .into_response()
}
