//! Listing page builder

use async_trait::async_trait;
use podcast_common::{Episode, EpisodeMapper, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::cache::PageBuilder;
use crate::source::EpisodeSource;

/// Props of the home page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub latest_episodes: Vec<Episode>,
    pub all_episodes: Vec<Episode>,
}

impl HomePage {
    /// Positional split: the first `latest_count` episodes are the latest
    /// group, the rest keep their fetch order in the second group
    pub fn partition(mut episodes: Vec<Episode>, latest_count: usize) -> Self {
        let split = latest_count.min(episodes.len());
        let all_episodes = episodes.split_off(split);
        Self {
            latest_episodes: episodes,
            all_episodes,
        }
    }

    /// Playback queue order: latest followed by all
    pub fn episode_list(&self) -> Vec<Episode> {
        self.latest_episodes
            .iter()
            .chain(self.all_episodes.iter())
            .cloned()
            .collect()
    }

    /// Queue index of an entry in the "all episodes" group
    pub fn all_episodes_offset(&self) -> usize {
        self.latest_episodes.len()
    }
}

pub struct HomePageBuilder {
    source: Arc<dyn EpisodeSource>,
    mapper: EpisodeMapper,
    listing_limit: usize,
    latest_count: usize,
}

impl HomePageBuilder {
    pub fn new(
        source: Arc<dyn EpisodeSource>,
        mapper: EpisodeMapper,
        listing_limit: usize,
        latest_count: usize,
    ) -> Self {
        Self {
            source,
            mapper,
            listing_limit,
            latest_count,
        }
    }
}

#[async_trait]
impl PageBuilder for HomePageBuilder {
    type Key = ();
    type Page = HomePage;

    fn name(&self) -> &'static str {
        "home"
    }

    async fn build(&self, _key: &()) -> Result<Option<HomePage>> {
        let records = self.source.latest_episodes(self.listing_limit).await?;
        debug!(count = records.len(), "Fetched listing records");

        let episodes = records
            .into_iter()
            .map(|raw| self.mapper.summary(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(HomePage::partition(episodes, self.latest_count)))
    }
}
