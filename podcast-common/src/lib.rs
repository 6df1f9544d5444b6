//! # Podcast Common Library
//!
//! Shared code for the podcast site including:
//! - Error taxonomy
//! - Configuration loading
//! - Duration formatting
//! - Raw episode records and the episode data mapper
//! - Playback state store

pub mod config;
pub mod duration;
pub mod episode;
pub mod error;
pub mod playback;

pub use episode::{DateLocale, Episode, EpisodeMapper, RawEpisode};
pub use error::{Error, Result};
pub use playback::PlaybackStore;
