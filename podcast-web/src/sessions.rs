//! Player sessions
//!
//! One [`PlaybackStore`] per listener, keyed by an opaque session id the
//! browser keeps for the lifetime of the tab. Sessions live in memory only.
//! When the registry is full the least recently used session is evicted.

use podcast_common::PlaybackStore;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

const MAX_SESSION_ID_LEN: usize = 64;

struct Session {
    store: PlaybackStore,
    last_seen: Instant,
}

/// Registry of live playback stores
pub struct PlayerSessions {
    sessions: Mutex<HashMap<String, Session>>,
    max_sessions: usize,
}

/// 1-64 chars of `[A-Za-z0-9_-]`
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl PlayerSessions {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Allocate a fresh idle session
    pub async fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.with_store(&id, |_| ()).await;
        id
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.lock().await.contains_key(id)
    }

    /// Run `f` against the session's store, creating the session if needed
    pub async fn with_store<T>(&self, id: &str, f: impl FnOnce(&mut PlaybackStore) -> T) -> T {
        let mut sessions = self.sessions.lock().await;

        if !sessions.contains_key(id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_seen)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                debug!(session = %oldest, "Evicting least recently used player session");
                sessions.remove(&oldest);
            }
        }

        let session = sessions.entry(id.to_string()).or_insert_with(|| Session {
            store: PlaybackStore::new(),
            last_seen: Instant::now(),
        });
        session.last_seen = Instant::now();
        f(&mut session.store)
    }
}
