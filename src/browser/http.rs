//! Static HTTP engine: plain GET plus DOM queries, no JavaScript.
//!
//! Much faster than chromium but only sees server-rendered markup. Useful
//! behind a prerendering proxy and for local fixtures.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{BrowserEngine, BrowserSession, ContextOptions, PageContext};
use crate::config::BrowserEngineConfig;
use crate::error::{Result, ScrapeError};
use crate::models::RawSnapshot;
use crate::scrapers::{document_has_selector, extract_from_html};

pub struct HttpEngine {
    config: BrowserEngineConfig,
}

impl HttpEngine {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BrowserEngine for HttpEngine {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>> {
        info!("Starting static HTTP engine");
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ScrapeError::Launch(format!("failed to build HTTP client: {}", e)))?;

        if self.config.block_resources {
            debug!("Resource blocking is implicit for the HTTP engine");
        }
        Ok(Arc::new(HttpSession { client }))
    }
}

struct HttpSession {
    client: reqwest::Client,
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn PageContext>> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            user_agent: options.user_agent.clone(),
            loaded: Mutex::new(None),
        }))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A fetched document. Parsing happens per query since `scraper::Html` is not `Send`.
struct LoadedPage {
    url: String,
    body: String,
}

struct HttpPage {
    client: reqwest::Client,
    user_agent: String,
    loaded: Mutex<Option<LoadedPage>>,
}

impl HttpPage {
    fn with_loaded<T>(&self, f: impl FnOnce(&LoadedPage) -> Result<T>) -> Result<T> {
        let guard = self
            .loaded
            .lock()
            .map_err(|_| ScrapeError::Browser("page state poisoned".to_string()))?;
        match guard.as_ref() {
            Some(page) => f(page),
            None => Err(ScrapeError::Browser(
                "no document loaded; call goto first".to_string(),
            )),
        }
    }
}

#[async_trait]
impl PageContext for HttpPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        info!("Navigating to {}", url);

        let request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(timeout)
            .send();

        let response = request.await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::NavigationTimeout {
                    url: url.to_string(),
                    secs: timeout.as_secs(),
                }
            } else {
                ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let body = response.text().await.map_err(|e| ScrapeError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        let mut guard = self
            .loaded
            .lock()
            .map_err(|_| ScrapeError::Browser("page state poisoned".to_string()))?;
        *guard = Some(LoadedPage {
            url: url.to_string(),
            body,
        });
        Ok(())
    }

    async fn has_selector(&self, selector: &str) -> Result<bool> {
        self.with_loaded(|page| document_has_selector(&page.body, selector))
    }

    async fn extract(&self) -> Result<RawSnapshot> {
        self.with_loaded(|page| {
            debug!("Extracting fields from {}", page.url);
            Ok(extract_from_html(&page.body))
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
