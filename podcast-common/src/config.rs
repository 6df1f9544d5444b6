//! Configuration loading
//!
//! Resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in defaults (fallback)
//!
//! Arguments and environment variables are both parsed by the binary
//! (clap `env`), which hands the winners to [`SiteConfig::apply_overrides`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::episode::DateLocale;
use crate::{Error, Result};

/// Site configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the remote episode API
    pub api_base_url: String,

    /// Address the HTTP server binds to
    pub bind_address: String,

    /// HTTP server port
    pub port: u16,

    /// Records fetched for the listing page
    pub listing_limit: usize,

    /// How many of the listing records form the "latest episodes" group
    pub latest_count: usize,

    /// Newest detail pages built at startup
    pub precomputed_count: usize,

    /// Listing page staleness tolerance in seconds
    pub listing_revalidate_secs: u64,

    /// Detail page staleness tolerance in seconds
    pub detail_revalidate_secs: u64,

    /// HTTP client timeout for the remote source
    pub request_timeout_secs: u64,

    /// Locale of the publish date display
    pub date_locale: DateLocale,

    /// Upper bound on live player sessions
    pub max_player_sessions: usize,

    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3333".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            listing_limit: 12,
            latest_count: 2,
            precomputed_count: 2,
            listing_revalidate_secs: 60 * 60 * 8,
            detail_revalidate_secs: 60 * 60 * 24,
            request_timeout_secs: 30,
            date_locale: DateLocale::PtBr,
            max_player_sessions: 1024,
            logging: LoggingConfig::default(),
        }
    }
}

/// Values taken from the command line or the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub date_locale: Option<DateLocale>,
    pub log_level: Option<String>,
}

impl SiteConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from the explicit path when given, else from the default
    /// location when a file exists there, else built-in defaults.
    ///
    /// A missing default file is not an error. An explicit path that
    /// cannot be read or parsed is.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.api_base_url {
            self.api_base_url = url;
        }
        if let Some(address) = overrides.bind_address {
            self.bind_address = address;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(locale) = overrides.date_locale {
            self.date_locale = locale;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if self.listing_limit == 0 {
            return Err(Error::Config("listing_limit must be at least 1".to_string()));
        }
        if self.latest_count > self.listing_limit {
            return Err(Error::Config(format!(
                "latest_count ({}) exceeds listing_limit ({})",
                self.latest_count, self.listing_limit
            )));
        }
        if self.listing_revalidate_secs == 0 || self.detail_revalidate_secs == 0 {
            return Err(Error::Config(
                "revalidation windows must be greater than zero".to_string(),
            ));
        }
        if self.max_player_sessions == 0 {
            return Err(Error::Config("max_player_sessions must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn listing_revalidate(&self) -> Duration {
        Duration::from_secs(self.listing_revalidate_secs)
    }

    pub fn detail_revalidate(&self) -> Duration {
        Duration::from_secs(self.detail_revalidate_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `<config dir>/podcast/config.toml` for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("podcast").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_revalidation_policy() {
        let config = SiteConfig::default();
        assert_eq!(config.listing_revalidate(), Duration::from_secs(28_800));
        assert_eq!(config.detail_revalidate(), Duration::from_secs(86_400));
        assert_eq!(config.listing_limit, 12);
        assert_eq!(config.latest_count, 2);
        assert_eq!(config.precomputed_count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SiteConfig::from_toml_str(
            r#"
            api_base_url = "https://api.example.com"
            date_locale = "en-US"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.date_locale, DateLocale::EnUs);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.port, 3000);
        assert_eq!(config.listing_revalidate_secs, 28_800);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SiteConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let config = SiteConfig::from_toml_str("port = 4000\napi_base_url = \"http://file\"")
            .unwrap()
            .apply_overrides(ConfigOverrides {
                port: Some(5000),
                log_level: Some("trace".to_string()),
                ..Default::default()
            });
        assert_eq!(config.port, 5000);
        assert_eq!(config.api_base_url, "http://file");
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_validate_rejects_latest_beyond_limit() {
        let config = SiteConfig {
            listing_limit: 1,
            latest_count: 2,
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = SiteConfig {
            detail_revalidate_secs: 0,
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listing_limit = 20\nlatest_count = 4").unwrap();

        let config = SiteConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.listing_limit, 20);
        assert_eq!(config.latest_count, 4);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(SiteConfig::load(Some(&missing)), Err(Error::Config(_))));
    }
}
