//! Playback state store
//!
//! One store per listener session. Holds the queue of episodes, the index of
//! the one selected to play and the play/loop/shuffle flags. Views read it
//! through [`PlaybackStore::snapshot`] and mutate it only through the
//! operations below.
//!
//! State machine: `Idle` (empty queue) and `Loaded` (queue non-empty, index
//! valid) with sub-states `Playing` / `Paused`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::episode::Episode;
use crate::{Error, Result};

/// Coarse playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
}

/// Serializable view of the store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub episode_list: Vec<Episode>,
    pub current_episode_index: Option<usize>,
    pub current_episode: Option<Episode>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Shared playback queue and flags
pub struct PlaybackStore {
    episode_list: Vec<Episode>,
    current_episode_index: Option<usize>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
    rng: StdRng,
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackStore {
    /// Create an empty (idle) store
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty store with deterministic shuffle order
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            episode_list: Vec::new(),
            current_episode_index: None,
            is_playing: false,
            is_looping: false,
            is_shuffling: false,
            rng,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn episode_list(&self) -> &[Episode] {
        &self.episode_list
    }

    pub fn current_episode_index(&self) -> Option<usize> {
        self.current_episode_index
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_episode_index
            .and_then(|index| self.episode_list.get(index))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    pub fn has_next(&self) -> bool {
        let len = self.episode_list.len();
        match self.current_episode_index {
            Some(index) => index + 1 < len || self.is_looping || (self.is_shuffling && len > 1),
            None => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current_episode_index, Some(index) if index > 0)
    }

    pub fn status(&self) -> PlaybackStatus {
        match (self.current_episode_index, self.is_playing) {
            (None, _) => PlaybackStatus::Idle,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status(),
            episode_list: self.episode_list.clone(),
            current_episode_index: self.current_episode_index,
            current_episode: self.current_episode().cloned(),
            is_playing: self.is_playing,
            is_looping: self.is_looping,
            is_shuffling: self.is_shuffling,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Replace the queue with `episode` alone and start playing it
    pub fn play(&mut self, episode: Episode) {
        self.episode_list = vec![episode];
        self.current_episode_index = Some(0);
        self.is_playing = true;
    }

    /// Replace the queue with `list` and start playing at `index`.
    ///
    /// An out-of-range index leaves the store untouched.
    pub fn play_list(&mut self, list: Vec<Episode>, index: usize) -> Result<()> {
        if index >= list.len() {
            return Err(Error::InvalidPlaybackIndex {
                index,
                len: list.len(),
            });
        }
        self.episode_list = list;
        self.current_episode_index = Some(index);
        self.is_playing = true;
        Ok(())
    }

    pub fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
    }

    /// Follow the media element when it pauses or ends on its own
    pub fn set_playing_state(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffling = !self.is_shuffling;
    }

    /// Back to idle. Loop and shuffle survive.
    pub fn clear_player_state(&mut self) {
        self.episode_list.clear();
        self.current_episode_index = None;
        self.is_playing = false;
    }

    /// Move to the next episode.
    ///
    /// Shuffle picks a random other index. Otherwise advance, wrapping to the
    /// start only when looping. On the last episode without loop this is a
    /// no-op.
    pub fn play_next(&mut self) -> Result<()> {
        let current = self.current_episode_index.ok_or(Error::EmptyQueue)?;
        self.current_episode_index = Some(self.next_index(current));
        Ok(())
    }

    fn next_index(&mut self, current: usize) -> usize {
        let len = self.episode_list.len();

        if self.is_shuffling {
            if len > 1 {
                // Draw from the len-1 other slots, then skip over current
                let pick = self.rng.gen_range(0..len - 1);
                if pick >= current {
                    pick + 1
                } else {
                    pick
                }
            } else {
                current
            }
        } else if current + 1 < len {
            current + 1
        } else if self.is_looping {
            0
        } else {
            current
        }
    }

    /// Move to the previous episode. No-op on the first one, loop or not.
    pub fn play_previous(&mut self) -> Result<()> {
        let current = self.current_episode_index.ok_or(Error::EmptyQueue)?;
        if current > 0 {
            self.current_episode_index = Some(current - 1);
        }
        Ok(())
    }

    /// The media element finished the current episode
    pub fn episode_ended(&mut self) {
        match self.current_episode_index {
            Some(current) if self.has_next() => {
                self.current_episode_index = Some(self.next_index(current));
            }
            _ => self.clear_player_state(),
        }
    }
}
