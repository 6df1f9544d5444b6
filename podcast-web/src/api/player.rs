//! Player session API
//!
//! Every call answers with the session's [`PlaybackSnapshot`]. Episodes are
//! resolved through the page caches, so playing from a page never costs an
//! extra fetch when that page is already generated.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use podcast_common::playback::PlaybackSnapshot;
use podcast_common::Error;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ApiError;
use crate::sessions::is_valid_session_id;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub episode_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayListRequest {
    /// Episode ids of the queue as the page rendered it (latest ++ all)
    pub episode_ids: Vec<String>,
    /// Position in `episode_ids`
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct PlayingRequest {
    pub playing: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: String,
}

type SnapshotResult = Result<Json<PlaybackSnapshot>, ApiError>;

fn checked(session: String) -> Result<String, ApiError> {
    if is_valid_session_id(&session) {
        Ok(session)
    } else {
        Err(ApiError::InvalidSession(session))
    }
}

/// POST /api/player
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.create().await;
    debug!(session = %session, "Player session created");
    (StatusCode::CREATED, Json(SessionResponse { session }))
}

/// GET /api/player/:session
pub async fn player_state(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    Ok(Json(state.sessions.with_store(&session, |store| store.snapshot()).await))
}

/// POST /api/player/:session/play
pub async fn play(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<PlayRequest>,
) -> SnapshotResult {
    let session = checked(session)?;
    let page = state
        .pages
        .episode(&request.episode_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Episode {}", request.episode_id)))?;
    let episode = page.episode.clone();

    Ok(Json(
        state
            .sessions
            .with_store(&session, |store| {
                store.play(episode);
                store.snapshot()
            })
            .await,
    ))
}

/// POST /api/player/:session/play-list
pub async fn play_list(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<PlayListRequest>,
) -> SnapshotResult {
    let session = checked(session)?;
    if request.index >= request.episode_ids.len() {
        return Err(Error::InvalidPlaybackIndex {
            index: request.index,
            len: request.episode_ids.len(),
        }
        .into());
    }
    let list = state.pages.queue(&request.episode_ids).await?;

    let snapshot = state
        .sessions
        .with_store(&session, |store| {
            store
                .play_list(list, request.index)
                .map(|()| store.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/player/:session/toggle
pub async fn toggle_play(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    Ok(Json(
        state
            .sessions
            .with_store(&session, |store| {
                store.toggle_play();
                store.snapshot()
            })
            .await,
    ))
}

/// POST /api/player/:session/playing
pub async fn set_playing(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<PlayingRequest>,
) -> SnapshotResult {
    let session = checked(session)?;
    Ok(Json(
        state
            .sessions
            .with_store(&session, |store| {
                store.set_playing_state(request.playing);
                store.snapshot()
            })
            .await,
    ))
}

/// POST /api/player/:session/loop
pub async fn toggle_loop(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    Ok(Json(
        state
            .sessions
            .with_store(&session, |store| {
                store.toggle_loop();
                store.snapshot()
            })
            .await,
    ))
}

/// POST /api/player/:session/shuffle
pub async fn toggle_shuffle(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    Ok(Json(
        state
            .sessions
            .with_store(&session, |store| {
                store.toggle_shuffle();
                store.snapshot()
            })
            .await,
    ))
}

/// POST /api/player/:session/next
pub async fn play_next(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    let snapshot = state
        .sessions
        .with_store(&session, |store| store.play_next().map(|()| store.snapshot()))
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/player/:session/previous
pub async fn play_previous(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    let snapshot = state
        .sessions
        .with_store(&session, |store| store.play_previous().map(|()| store.snapshot()))
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/player/:session/ended
pub async fn episode_ended(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    Ok(Json(
        state
            .sessions
            .with_store(&session, |store| {
                store.episode_ended();
                store.snapshot()
            })
            .await,
    ))
}

/// DELETE /api/player/:session
pub async fn clear_player(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> SnapshotResult {
    let session = checked(session)?;
    Ok(Json(
        state
            .sessions
            .with_store(&session, |store| {
                store.clear_player_state();
                store.snapshot()
            })
            .await,
    ))
}
