//! podcast-web - server-rendered podcast listing site
//!
//! Serves the home page and one page per episode from the remote episode
//! API, plus the player session API used by the page script.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use podcast_common::config::{ConfigOverrides, SiteConfig};
use podcast_common::DateLocale;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podcast_web::pages::{PageSettings, Pages};
use podcast_web::sessions::PlayerSessions;
use podcast_web::source::{EpisodeSource, HttpEpisodeSource, MemoryEpisodeSource};
use podcast_web::{build_router, AppState};

/// Command-line arguments for podcast-web
#[derive(Parser, Debug)]
#[command(name = "podcast-web")]
#[command(about = "Server-rendered podcast listing site")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "PODCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the episode API
    #[arg(long, env = "PODCAST_API_URL")]
    api_url: Option<String>,

    /// Serve episodes from a local JSON file instead of the API
    #[arg(long, env = "PODCAST_EPISODES_FILE", conflicts_with = "api_url")]
    episodes_file: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "PODCAST_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PODCAST_PORT")]
    port: Option<u16>,

    /// Date display locale (pt-BR, en-US)
    #[arg(long, env = "PODCAST_LOCALE", value_parser = parse_locale)]
    locale: Option<DateLocale>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "PODCAST_LOG_LEVEL")]
    log_level: Option<String>,
}

fn parse_locale(value: &str) -> std::result::Result<DateLocale, String> {
    value.parse().map_err(|e: podcast_common::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = SiteConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?
        .apply_overrides(ConfigOverrides {
            api_base_url: args.api_url.clone(),
            bind_address: args.bind.clone(),
            port: args.port,
            date_locale: args.locale,
            log_level: args.log_level.clone(),
        });

    // Initialize tracing
    let default_filter = format!(
        "podcast_web={level},podcast_common={level},tower_http=info",
        level = config.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting podcast-web v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;

    let source: Arc<dyn EpisodeSource> = match &args.episodes_file {
        Some(path) => {
            info!("Serving episodes from {}", path.display());
            Arc::new(
                MemoryEpisodeSource::from_json_file(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
            )
        }
        None => {
            info!("Episode API: {}", config.api_base_url);
            Arc::new(
                HttpEpisodeSource::new(&config.api_base_url, config.request_timeout())
                    .context("Failed to create episode API client")?,
            )
        }
    };

    let pages = Pages::new(source, PageSettings::from_config(&config));

    // Pages that fail here are built on first request instead
    match pages.prewarm().await {
        Ok(ids) => info!("✓ Prewarmed home page and {} episode pages", ids.len()),
        Err(e) => warn!("Prewarm failed, pages will be built on demand: {}", e),
    }

    let state = AppState::new(pages, PlayerSessions::new(config.max_player_sessions));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("podcast-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
