//! Shared fixtures for podcast-web integration tests

#![allow(dead_code)]

use podcast_common::config::SiteConfig;
use podcast_common::{DateLocale, RawEpisode};
use podcast_web::pages::{PageSettings, Pages};
use podcast_web::sessions::PlayerSessions;
use podcast_web::source::MemoryEpisodeSource;
use podcast_web::{build_router, AppState};
use serde_json::json;
use std::sync::Arc;

/// Record published on January `day`, 2021
pub fn record(day: u32) -> RawEpisode {
    serde_json::from_value(json!({
        "id": format!("ep-{:02}", day),
        "title": format!("Episode {}", day),
        "members": "Diego & Rodrigo",
        "thumbnail": format!("https://example.com/{}.jpg", day),
        "published_at": format!("2021-01-{:02} 10:00:00", day),
        "description": format!("<p>Show notes {}</p>", day),
        "file": {
            "url": format!("https://example.com/{}.m4a", day),
            "type": "audio/x-m4a",
            "duration": (day as u64 * 100).to_string(),
        }
    }))
    .expect("fixture record should deserialize")
}

/// `count` records, oldest first (day 1 .. day count)
pub fn records(count: u32) -> Vec<RawEpisode> {
    (1..=count).map(record).collect()
}

pub fn settings() -> PageSettings {
    let config = SiteConfig {
        date_locale: DateLocale::EnUs,
        ..SiteConfig::default()
    };
    PageSettings::from_config(&config)
}

pub fn source(count: u32) -> Arc<MemoryEpisodeSource> {
    Arc::new(MemoryEpisodeSource::new(records(count)))
}

pub fn pages(source: &Arc<MemoryEpisodeSource>) -> Pages {
    Pages::new(source.clone(), settings())
}

pub fn app(source: &Arc<MemoryEpisodeSource>) -> axum::Router {
    build_router(AppState::new(pages(source), PlayerSessions::new(16)))
}
