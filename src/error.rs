//! Error taxonomy for scraping.

use thiserror::Error;

/// Errors raised while acquiring a browser session or extracting a page.
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    /// The automation engine could not be started or reached.
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// The session manager has been shut down.
    #[error("Browser session manager is shutting down")]
    ShuttingDown,

    /// The shared session died underneath us.
    #[error("Browser session closed: {0}")]
    SessionClosed(String),

    #[error("Navigation timed out after {secs}s for {url}")]
    NavigationTimeout { url: String, secs: u64 },

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {secs}s waiting for selector {selector} on {url}")]
    SelectorTimeout {
        url: String,
        selector: String,
        secs: u64,
    },

    #[error("Extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    /// The whole scrape exceeded its overall bound and was cancelled.
    #[error("Scrape of {url} cancelled after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

impl ScrapeError {
    /// Whether this error means no session could be obtained at all.
    ///
    /// The HTTP layer reports these as "service unavailable" rather than
    /// as a failed scrape.
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Launch(_) | Self::ShuttingDown)
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
