//! Page generation
//!
//! Two routes, each backed by a [`RevalidatingCache`]:
//! - `/` listing, rebuilt in the background once older than the listing window
//! - `/episodes/{id}` detail, precomputed for the newest few episodes and
//!   built on first request for every other id

pub mod cache;
pub mod episode;
pub mod home;

use podcast_common::config::SiteConfig;
use podcast_common::{Episode, EpisodeMapper, Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::source::EpisodeSource;

pub use cache::{CacheEntry, PageBuilder, RevalidatingCache};
pub use episode::{EpisodePage, EpisodePageBuilder};
pub use home::{HomePage, HomePageBuilder};

/// Page generation policy
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub listing_limit: usize,
    pub latest_count: usize,
    pub precomputed_count: usize,
    pub listing_revalidate: Duration,
    pub detail_revalidate: Duration,
    pub mapper: EpisodeMapper,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}

impl PageSettings {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            listing_limit: config.listing_limit,
            latest_count: config.latest_count,
            precomputed_count: config.precomputed_count,
            listing_revalidate: config.listing_revalidate(),
            detail_revalidate: config.detail_revalidate(),
            mapper: EpisodeMapper::new(config.date_locale),
        }
    }
}

/// Both page caches over one source
pub struct Pages {
    source: Arc<dyn EpisodeSource>,
    home: RevalidatingCache<HomePageBuilder>,
    episodes: RevalidatingCache<EpisodePageBuilder>,
    precomputed_count: usize,
    listing_limit: usize,
}

impl Pages {
    pub fn new(source: Arc<dyn EpisodeSource>, settings: PageSettings) -> Self {
        let home = RevalidatingCache::new(
            HomePageBuilder::new(
                Arc::clone(&source),
                settings.mapper,
                settings.listing_limit,
                settings.latest_count,
            ),
            settings.listing_revalidate,
        );
        let episodes = RevalidatingCache::new(
            EpisodePageBuilder::new(Arc::clone(&source), settings.mapper),
            settings.detail_revalidate,
        );

        Self {
            source,
            home,
            episodes,
            precomputed_count: settings.precomputed_count,
            listing_limit: settings.listing_limit,
        }
    }

    pub async fn home(&self) -> Result<Arc<HomePage>> {
        self.home
            .get(&())
            .await?
            .ok_or_else(|| Error::NotFound("home page".to_string()))
    }

    /// `Ok(None)` when the source has no episode with this id
    pub async fn episode(&self, id: &str) -> Result<Option<Arc<EpisodePage>>> {
        self.episodes.get(&id.to_string()).await
    }

    /// Resolve a queue rendered earlier, in its rendered order.
    ///
    /// Ids still on the current listing are taken from it. Ids that dropped
    /// off it since the page was rendered come from the detail cache,
    /// reduced to their listing form.
    pub async fn queue(&self, ids: &[String]) -> Result<Vec<Episode>> {
        if ids.len() > self.listing_limit {
            return Err(Error::InvalidQueue(format!(
                "{} episodes, at most {} allowed",
                ids.len(),
                self.listing_limit
            )));
        }

        let home = self.home().await?;
        let listed: HashMap<&str, &Episode> = home
            .latest_episodes
            .iter()
            .chain(&home.all_episodes)
            .map(|episode| (episode.id.as_str(), episode))
            .collect();

        let mut queue = Vec::with_capacity(ids.len());
        for id in ids {
            let episode = match listed.get(id.as_str()) {
                Some(episode) => Episode::clone(episode),
                None => {
                    let page = self
                        .episode(id)
                        .await?
                        .ok_or_else(|| Error::NotFound(format!("Episode {}", id)))?;
                    Episode {
                        description: None,
                        ..page.episode.clone()
                    }
                }
            };
            queue.push(episode);
        }
        Ok(queue)
    }

    /// Build the listing and the newest detail pages ahead of requests.
    ///
    /// Returns the precomputed episode ids.
    pub async fn prewarm(&self) -> Result<Vec<String>> {
        self.home.prime(&()).await?;

        let ids: Vec<String> = self
            .source
            .latest_episodes(self.precomputed_count)
            .await?
            .into_iter()
            .map(|raw| raw.id)
            .collect();

        for id in &ids {
            self.episodes.prime(id).await?;
        }

        info!(count = ids.len(), "Precomputed episode pages: {:?}", ids);
        Ok(ids)
    }

    pub fn home_cache(&self) -> &RevalidatingCache<HomePageBuilder> {
        &self.home
    }

    pub fn episode_cache(&self) -> &RevalidatingCache<EpisodePageBuilder> {
        &self.episodes
    }
}
