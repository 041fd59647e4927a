//! Weather page extractor.

use std::time::Instant;

use tracing::{debug, info};

use crate::browser::{release_context, BrowserSession, ContextOptions, PageContext};
use crate::config::{ScrapeConfig, SiteConfig};
use crate::error::{Result, ScrapeError};
use crate::models::{CitySlug, WeatherSnapshot};

/// Navigates a browsing context to a city's forecast page and pulls out
/// the weather fields.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    site: SiteConfig,
    scrape: ScrapeConfig,
    options: ContextOptions,
}

impl PageExtractor {
    pub fn new(site: SiteConfig, scrape: ScrapeConfig, options: ContextOptions) -> Self {
        Self {
            site,
            scrape,
            options,
        }
    }

    pub fn forecast_url(&self, slug: &CitySlug) -> String {
        self.site.forecast_url(slug.as_str())
    }

    /// Extract a snapshot for one city.
    ///
    /// The browsing context is closed on every path, including when the
    /// overall scrape timeout cancels the work in flight.
    pub async fn extract(
        &self,
        session: &dyn BrowserSession,
        slug: &CitySlug,
    ) -> Result<WeatherSnapshot> {
        let url = self.forecast_url(slug);
        let context = session.new_context(&self.options).await?;

        let bound = self.scrape.timeout();
        let outcome = tokio::time::timeout(bound, self.run(context.as_ref(), &url)).await;

        release_context(context, &url).await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout {
                url,
                secs: bound.as_secs(),
            }),
        }
    }

    async fn run(&self, page: &dyn PageContext, url: &str) -> Result<WeatherSnapshot> {
        info!("Navigating to {}...", url);
        page.goto(url, self.scrape.navigation_timeout()).await?;

        debug!("Page loaded, waiting for {}", self.site.ready_selector);
        self.wait_for_ready(page, url).await?;

        let raw = page.extract().await?;
        info!("Scraped weather data from {}", url);
        Ok(WeatherSnapshot::from(raw))
    }

    /// Poll for the readiness selector until it appears or the bound elapses.
    async fn wait_for_ready(&self, page: &dyn PageContext, url: &str) -> Result<()> {
        let selector = self.site.ready_selector.as_str();
        let bound = self.scrape.selector_timeout();
        let interval = self.scrape.selector_poll_interval();
        let started = Instant::now();

        let poll = async {
            loop {
                if page.has_selector(selector).await? {
                    debug!(
                        "Selector {} appeared after {:?}",
                        selector,
                        started.elapsed()
                    );
                    return Ok::<(), ScrapeError>(());
                }
                tokio::time::sleep(interval).await;
            }
        };

        tokio::time::timeout(bound, poll)
            .await
            .map_err(|_| ScrapeError::SelectorTimeout {
                url: url.to_string(),
                selector: selector.to_string(),
                secs: bound.as_secs(),
            })?
    }
}
