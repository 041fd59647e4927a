//! Browser automation behind a narrow capability interface.
//!
//! An engine launches a [`BrowserSession`]; a session hands out isolated
//! [`PageContext`]s. The extractor only talks to these traits, so the
//! chromium engine, the static HTTP engine, and test stubs are
//! interchangeable.

mod binary;
#[cfg(feature = "browser")]
mod chromium;
mod http;
mod session;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{BrowserEngineConfig, BrowserEngineType};
use crate::error::Result;
use crate::models::RawSnapshot;

pub use binary::find_chrome_executable;
#[cfg(feature = "browser")]
pub use chromium::ChromiumEngine;
pub use http::HttpEngine;
pub use session::SessionManager;

/// Per-context options applied before navigation.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub user_agent: String,
    /// Abort image, stylesheet, font and media sub-resources.
    pub block_resources: bool,
}

impl ContextOptions {
    pub fn from_config(config: &BrowserEngineConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            block_resources: config.block_resources,
        }
    }
}

/// Starts automation sessions.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Start (or connect to) the engine. Failures must be `ScrapeError::Launch`.
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>>;
}

/// A live engine process shared by all requests.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a fresh browsing context.
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn PageContext>>;

    /// Release the engine. Safe to call more than once.
    async fn close(&self) -> Result<()>;
}

/// One isolated page/tab.
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Navigate and wait until the network is idle, bounded by `timeout`.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Whether `selector` currently matches an element.
    async fn has_selector(&self, selector: &str) -> Result<bool>;

    /// Pull the fixed weather field set out of the rendered DOM.
    async fn extract(&self) -> Result<RawSnapshot>;

    /// Release the context (never the shared session).
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Close a browsing context, logging (never propagating) a failure.
pub async fn release_context(context: Box<dyn PageContext>, url: &str) {
    if let Err(e) = context.close().await {
        tracing::warn!("Failed to close browsing context for {}: {}", url, e);
    }
}

/// Build the engine selected by configuration.
pub fn engine_from_config(config: &BrowserEngineConfig) -> Arc<dyn BrowserEngine> {
    match config.engine {
        #[cfg(feature = "browser")]
        BrowserEngineType::Chromium => Arc::new(ChromiumEngine::new(config.clone())),
        #[cfg(not(feature = "browser"))]
        BrowserEngineType::Chromium => {
            tracing::warn!(
                "Chromium support not compiled (rebuild with --features browser), using http engine"
            );
            Arc::new(HttpEngine::new(config.clone()))
        }
        BrowserEngineType::Http => Arc::new(HttpEngine::new(config.clone())),
    }
}
