//! Remote episode source
//!
//! [`EpisodeSource`] is the read-only seam to the episode API:
//! - `GET /episodes?_limit=N&_sort=published_at&_order=desc`
//! - `GET /episodes/{id}`
//!
//! [`HttpEpisodeSource`] talks to the real API. [`MemoryEpisodeSource`]
//! serves records loaded from a JSON file (the API's own `server.json`
//! layout) and counts fetches.

use async_trait::async_trait;
use podcast_common::episode::parse_published_at;
use podcast_common::{Error, RawEpisode, Result};
use reqwest::{StatusCode, Url};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

const USER_AGENT: &str = concat!("podcast-web/", env!("CARGO_PKG_VERSION"));

/// Read-only access to episode records
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    /// Up to `limit` records, newest first
    async fn latest_episodes(&self, limit: usize) -> Result<Vec<RawEpisode>>;

    /// One record by id, `None` when the source has no such episode
    async fn episode(&self, id: &str) -> Result<Option<RawEpisode>>;
}

// ============================================================================
// HTTP source
// ============================================================================

/// Episode API client
pub struct HttpEpisodeSource {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpEpisodeSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid api_base_url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("api_base_url cannot be a base: {}", base_url)));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::SourceFetch(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// `{base}/episodes[/{id}]`, id pushed as an encoded path segment
    fn episodes_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("api_base_url cannot be a base: {}", self.base_url)))?;
            segments.pop_if_empty().push("episodes");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn fetch_body(&self, request: reqwest::RequestBuilder) -> Result<Option<String>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::SourceFetch(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::SourceFetch(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| Error::SourceFetch(e.to_string()))
    }
}

#[async_trait]
impl EpisodeSource for HttpEpisodeSource {
    async fn latest_episodes(&self, limit: usize) -> Result<Vec<RawEpisode>> {
        let url = self.episodes_url(None)?;
        debug!(url = %url, limit, "Fetching latest episodes");

        let request = self.http_client.get(url).query(&[
            ("_limit", limit.to_string()),
            ("_sort", "published_at".to_string()),
            ("_order", "desc".to_string()),
        ]);

        let body = self
            .fetch_body(request)
            .await?
            .ok_or_else(|| Error::SourceFetch("episode collection not found".to_string()))?;

        serde_json::from_str(&body).map_err(|e| Error::malformed("episodes", e.to_string()))
    }

    async fn episode(&self, id: &str) -> Result<Option<RawEpisode>> {
        let url = self.episodes_url(Some(id))?;
        debug!(url = %url, "Fetching episode");

        match self.fetch_body(self.http_client.get(url)).await? {
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| Error::malformed(id, e.to_string())),
            None => Ok(None),
        }
    }
}

// ============================================================================
// In-memory source
// ============================================================================

/// Records held in memory, with fetch counters
#[derive(Default)]
pub struct MemoryEpisodeSource {
    records: RwLock<Vec<RawEpisode>>,
    failure: RwLock<Option<String>>,
    delay: Option<Duration>,
    list_fetches: AtomicUsize,
    episode_fetches: Mutex<HashMap<String, usize>>,
}

impl MemoryEpisodeSource {
    pub fn new(records: Vec<RawEpisode>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Default::default()
        }
    }

    /// Parse either a bare array of records or `{"episodes": [...]}`
    pub fn from_json(text: &str) -> Result<Self> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Document {
            Bare(Vec<RawEpisode>),
            Server { episodes: Vec<RawEpisode> },
        }

        let records = match serde_json::from_str::<Document>(text)
            .map_err(|e| Error::malformed("episodes", e.to_string()))?
        {
            Document::Bare(records) => records,
            Document::Server { episodes } => episodes,
        };
        Ok(Self::new(records))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Sleep this long inside every fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn replace_records(&self, records: Vec<RawEpisode>) {
        *self.records.write().await = records;
    }

    /// Make every fetch fail with `SourceFetch(reason)`, or succeed again with `None`
    pub async fn set_failure(&self, reason: Option<&str>) {
        *self.failure.write().await = reason.map(str::to_string);
    }

    pub fn list_fetches(&self) -> usize {
        self.list_fetches.load(Ordering::SeqCst)
    }

    pub async fn episode_fetches(&self, id: &str) -> usize {
        self.episode_fetches.lock().await.get(id).copied().unwrap_or(0)
    }

    pub async fn total_episode_fetches(&self) -> usize {
        self.episode_fetches.lock().await.values().sum()
    }

    async fn simulate_network(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.read().await.as_ref() {
            Some(reason) => Err(Error::SourceFetch(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EpisodeSource for MemoryEpisodeSource {
    async fn latest_episodes(&self, limit: usize) -> Result<Vec<RawEpisode>> {
        self.list_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;

        let mut records = self.records.read().await.clone();
        // Newest first, unparseable timestamps last
        records.sort_by(|a, b| {
            parse_published_at(&b.published_at).cmp(&parse_published_at(&a.published_at))
        });
        records.truncate(limit);
        Ok(records)
    }

    async fn episode(&self, id: &str) -> Result<Option<RawEpisode>> {
        *self
            .episode_fetches
            .lock()
            .await
            .entry(id.to_string())
            .or_insert(0) += 1;
        self.simulate_network().await?;

        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }
}
