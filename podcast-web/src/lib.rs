//! podcast-web library - server-rendered podcast site
//!
//! Listing and detail pages generated from the remote episode API through
//! revalidating caches, plus a JSON API for per-session playback state.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod pages;
pub mod sessions;
pub mod source;
pub mod views;

use pages::Pages;
use sessions::PlayerSessions;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Page caches over the episode source
    pub pages: Arc<Pages>,
    /// Live playback stores, one per listener session
    pub sessions: Arc<PlayerSessions>,
}

impl AppState {
    /// Create new application state
    pub fn new(pages: Pages, sessions: PlayerSessions) -> Self {
        Self {
            pages: Arc::new(pages),
            sessions: Arc::new(sessions),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let pages = Router::new()
        .route("/", get(api::serve_home))
        .route("/episodes/:id", get(api::serve_episode))
        .route("/static/player.js", get(api::serve_player_js));

    let props = Router::new()
        .route("/api/pages/home", get(api::home_props))
        .route("/api/pages/episodes/:id", get(api::episode_props));

    let player = Router::new()
        .route("/api/player", post(api::create_session))
        .route(
            "/api/player/:session",
            get(api::player_state).delete(api::clear_player),
        )
        .route("/api/player/:session/play", post(api::play))
        .route("/api/player/:session/play-list", post(api::play_list))
        .route("/api/player/:session/toggle", post(api::toggle_play))
        .route("/api/player/:session/playing", post(api::set_playing))
        .route("/api/player/:session/loop", post(api::toggle_loop))
        .route("/api/player/:session/shuffle", post(api::toggle_shuffle))
        .route("/api/player/:session/next", post(api::play_next))
        .route("/api/player/:session/previous", post(api::play_previous))
        .route("/api/player/:session/ended", post(api::episode_ended));

    Router::new()
        .merge(pages)
        .merge(props)
        .merge(player)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
