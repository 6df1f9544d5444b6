//! Detail page builder

use async_trait::async_trait;
use podcast_common::{Episode, EpisodeMapper, Result};
use serde::Serialize;
use std::sync::Arc;

use super::cache::PageBuilder;
use crate::source::EpisodeSource;

/// Props of an episode detail page
#[derive(Debug, Clone, Serialize)]
pub struct EpisodePage {
    pub episode: Episode,
}

pub struct EpisodePageBuilder {
    source: Arc<dyn EpisodeSource>,
    mapper: EpisodeMapper,
}

impl EpisodePageBuilder {
    pub fn new(source: Arc<dyn EpisodeSource>, mapper: EpisodeMapper) -> Self {
        Self { source, mapper }
    }
}

#[async_trait]
impl PageBuilder for EpisodePageBuilder {
    type Key = String;
    type Page = EpisodePage;

    fn name(&self) -> &'static str {
        "episode"
    }

    async fn build(&self, id: &String) -> Result<Option<EpisodePage>> {
        match self.source.episode(id).await? {
            Some(raw) => Ok(Some(EpisodePage {
                episode: self.mapper.detail(raw)?,
            })),
            None => Ok(None),
        }
    }
}
