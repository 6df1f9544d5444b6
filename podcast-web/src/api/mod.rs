//! HTTP handlers for podcast-web

pub mod error;
pub mod health;
pub mod pages;
pub mod player;

pub use error::{ApiError, PageError};
pub use health::health_routes;
pub use pages::{episode_props, home_props, serve_episode, serve_home, serve_player_js};
pub use player::{
    clear_player, create_session, episode_ended, play, play_list, play_next, play_previous,
    player_state, set_playing, toggle_loop, toggle_play, toggle_shuffle,
};
