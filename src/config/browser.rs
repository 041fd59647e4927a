//! Browser engine configuration types.
//!
//! These live outside `#[cfg(feature = "browser")]` so config parsing works
//! even when the chromium engine is compiled out.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Desktop Chrome user agent sent by every browsing context.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Automation engine backing the browser session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BrowserEngineType {
    /// Headless Chrome/Chromium over CDP (default).
    #[default]
    Chromium,

    /// Plain HTTP fetch with static DOM queries. No JavaScript runs.
    Http,
}

impl BrowserEngineType {
    /// Parse from string (for CLI/env var).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "chromium" | "chrome" => Some(Self::Chromium),
            "http" | "static" => Some(Self::Http),
            _ => None,
        }
    }
}

impl std::fmt::Display for BrowserEngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chromium => write!(f, "chromium"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserEngineConfig {
    /// Automation engine.
    #[serde(default)]
    pub engine: BrowserEngineType,

    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Chrome/Chromium executable. Probed from common locations when unset.
    /// Can also be set via CHROME_PATH (or PUPPETEER_EXECUTABLE_PATH).
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// User agent for every browsing context.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Abort image, stylesheet, font and media requests.
    #[serde(default = "default_true")]
    pub block_resources: bool,

    /// Seconds to wait before retrying a failed launch.
    #[serde(default = "default_launch_retry_cooldown")]
    pub launch_retry_cooldown: u64,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngineType::default(),
            headless: default_headless(),
            executable: None,
            remote_url: None,
            chrome_args: Vec::new(),
            user_agent: default_user_agent(),
            block_resources: default_true(),
            launch_retry_cooldown: default_launch_retry_cooldown(),
        }
    }
}

impl BrowserEngineConfig {
    /// Apply environment variable overrides.
    ///
    /// - `CHROME_PATH` / `PUPPETEER_EXECUTABLE_PATH` - Chromium executable
    /// - `BROWSER_URL` - Remote Chrome DevTools URL
    /// - `BROWSER_ENGINE` - `chromium` or `http`
    pub fn with_env_overrides(mut self) -> Self {
        let executable = ["CHROME_PATH", "PUPPETEER_EXECUTABLE_PATH"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|val| !val.is_empty());
        if let Some(path) = executable {
            self.executable = Some(PathBuf::from(path));
        }

        if let Ok(val) = std::env::var("BROWSER_URL") {
            if !val.is_empty() {
                self.remote_url = Some(val);
            }
        }

        if let Ok(val) = std::env::var("BROWSER_ENGINE") {
            if let Some(engine) = BrowserEngineType::from_str(&val) {
                self.engine = engine;
            }
        }

        self
    }

    pub fn launch_retry_cooldown(&self) -> Duration {
        Duration::from_secs(self.launch_retry_cooldown)
    }
}

pub fn default_headless() -> bool {
    true
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_launch_retry_cooldown() -> u64 {
    30
}
