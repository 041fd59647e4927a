//! Configuration management for weatherscrape.
//!
//! Settings come from an optional TOML file, then environment overrides.
//! Every field has a default, so running with no file at all is fine.

pub mod browser;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use browser::{BrowserEngineConfig, BrowserEngineType, DEFAULT_USER_AGENT};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "weatherscrape.toml";

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Address to bind: PORT, HOST, or HOST:PORT.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Target weather site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    /// Scheme and host of the weather site.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Country segment of the forecast path.
    #[serde(default = "default_region")]
    pub region: String,
    /// Element whose presence means the forecast has rendered.
    #[serde(default = "default_ready_selector")]
    pub ready_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            region: default_region(),
            ready_selector: default_ready_selector(),
        }
    }
}

impl SiteConfig {
    /// Forecast page URL for a normalized city slug.
    pub fn forecast_url(&self, slug: &str) -> String {
        format!(
            "{}/forecast/{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.region.trim_matches('/'),
            slug
        )
    }
}

/// Timeouts for one extraction, all in seconds unless noted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapeConfig {
    /// Bound on navigation until the network is idle.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout: u64,
    /// Bound on waiting for the readiness selector.
    #[serde(default = "default_selector_timeout")]
    pub selector_timeout: u64,
    /// Readiness selector poll interval in milliseconds.
    #[serde(default = "default_selector_poll_ms")]
    pub selector_poll_ms: u64,
    /// Bound on a whole extraction. The context is closed when it fires.
    #[serde(default = "default_scrape_timeout")]
    pub timeout: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: default_navigation_timeout(),
            selector_timeout: default_selector_timeout(),
            selector_poll_ms: default_selector_poll_ms(),
            timeout: default_scrape_timeout(),
        }
    }
}

impl ScrapeConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout)
    }

    pub fn selector_poll_interval(&self) -> Duration {
        Duration::from_millis(self.selector_poll_ms.max(10))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Snapshot cache policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Entry lifetime in seconds. Entries never expire when unset.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Invalid configuration")
    }

    /// Apply environment variable overrides.
    ///
    /// - `PORT` - replaces the port of `server.bind`
    /// - `WEATHER_SITE_URL` - replaces `site.base_url`
    /// - browser variables, see [`BrowserEngineConfig::with_env_overrides`]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.trim().parse::<u16>() {
                let host = match self.server.bind.rsplit_once(':') {
                    Some((host, _)) => host.to_string(),
                    None if self.server.bind.parse::<u16>().is_ok() => "0.0.0.0".to_string(),
                    None => self.server.bind.clone(),
                };
                self.server.bind = format!("{}:{}", host, port);
            }
        }

        if let Ok(url) = std::env::var("WEATHER_SITE_URL") {
            if !url.is_empty() {
                self.site.base_url = url;
            }
        }

        self.browser = self.browser.with_env_overrides();
        self
    }
}

impl Settings {
    /// Reject settings that cannot produce a working scraper.
    pub fn validate(&self) -> anyhow::Result<()> {
        let base = url::Url::parse(&self.site.base_url)
            .with_context(|| format!("Invalid site.base_url: {}", self.site.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("site.base_url must be http or https: {}", self.site.base_url);
        }
        if self.site.ready_selector.trim().is_empty() {
            anyhow::bail!("site.ready_selector must not be empty");
        }
        for (name, secs) in [
            ("scrape.navigation_timeout", self.scrape.navigation_timeout),
            ("scrape.selector_timeout", self.scrape.selector_timeout),
            ("scrape.timeout", self.scrape.timeout),
        ] {
            if secs == 0 {
                anyhow::bail!("{} must be greater than zero", name);
            }
        }
        Ok(())
    }
}

/// Resolve which config file to read, if any.
///
/// An explicit path wins, then `WEATHERSCRAPE_CONFIG`, then
/// `./weatherscrape.toml` when it exists.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("WEATHERSCRAPE_CONFIG") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

/// Load settings from the resolved config file plus environment overrides.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match config_path(explicit) {
        Some(path) => {
            info!("Loading config from {}", path.display());
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Settings::from_toml(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => {
            debug!("No config file found, using defaults");
            Settings::default()
        }
    };

    let settings = settings.with_env_overrides();
    settings.validate()?;
    Ok(settings)
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_base_url() -> String {
    "https://world-weather.info".to_string()
}

fn default_region() -> String {
    "pakistan".to_string()
}

fn default_ready_selector() -> String {
    "#weather-now-number".to_string()
}

fn default_navigation_timeout() -> u64 {
    90
}

fn default_selector_timeout() -> u64 {
    120
}

fn default_selector_poll_ms() -> u64 {
    250
}

fn default_scrape_timeout() -> u64 {
    240
}
