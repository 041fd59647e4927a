//! Cache-or-scrape resolution for one or many cities.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::browser::{engine_from_config, ContextOptions, SessionManager};
use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use crate::models::{CitySlug, WeatherSnapshot};
use crate::scrapers::PageExtractor;
use crate::server::WeatherCache;

/// Service resolving cities to weather snapshots.
///
/// Owns nothing global: the cache, the session manager and the extractor
/// are handed in, so tests can wire a stub engine.
#[derive(Clone)]
pub struct WeatherService {
    cache: Arc<WeatherCache>,
    sessions: Arc<SessionManager>,
    extractor: Arc<PageExtractor>,
    inflight: Arc<Mutex<HashMap<String, SharedScrape>>>,
}

/// A scrape in progress, awaitable by every request for the same city.
type SharedScrape = Shared<BoxFuture<'static, Result<Arc<WeatherSnapshot>>>>;

impl WeatherService {
    pub fn new(
        cache: Arc<WeatherCache>,
        sessions: Arc<SessionManager>,
        extractor: Arc<PageExtractor>,
    ) -> Self {
        Self {
            cache,
            sessions,
            extractor,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Wire the service from settings, using the configured engine.
    pub fn from_settings(settings: &Settings) -> Self {
        let engine = engine_from_config(&settings.browser);
        let sessions = SessionManager::new(engine, settings.browser.launch_retry_cooldown());
        let extractor = PageExtractor::new(
            settings.site.clone(),
            settings.scrape.clone(),
            ContextOptions::from_config(&settings.browser),
        );

        Self::new(
            Arc::new(WeatherCache::with_ttl(settings.cache.ttl())),
            Arc::new(sessions),
            Arc::new(extractor),
        )
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Return the cached snapshot or scrape, cache and return a fresh one.
    ///
    /// Concurrent misses for one city share a single scrape. The scrape
    /// runs in its own task that also writes the cache, so dropping this
    /// future (a client that disconnected) loses nothing.
    pub async fn resolve(&self, city: &CitySlug) -> Result<Arc<WeatherSnapshot>> {
        if let Some(hit) = self.cache.get(city) {
            debug!("Cache hit for {}", city);
            return Ok(hit);
        }

        let scrape = {
            let mut inflight = self
                .inflight
                .lock()
                .map_err(|_| ScrapeError::Browser("in-flight table poisoned".to_string()))?;

            // The owning task may have finished between the first lookup and the lock
            if let Some(hit) = self.cache.get(city) {
                return Ok(hit);
            }

            match inflight.get(city.cache_key()) {
                Some(scrape) => {
                    debug!("Joining in-flight scrape for {}", city);
                    scrape.clone()
                }
                None => {
                    let service = self.clone();
                    let slug = city.clone();
                    let handle = tokio::spawn(async move { service.scrape_and_store(slug).await });

                    let table = self.inflight.clone();
                    let key = city.cache_key().to_string();
                    let scrape = async move {
                        match handle.await {
                            Ok(result) => result,
                            Err(e) => {
                                if let Ok(mut inflight) = table.lock() {
                                    inflight.remove(&key);
                                }
                                Err(ScrapeError::Browser(format!(
                                    "scrape task failed: {}",
                                    e
                                )))
                            }
                        }
                    }
                    .boxed()
                    .shared();
                    inflight.insert(city.cache_key().to_string(), scrape.clone());
                    scrape
                }
            }
        };

        scrape.await
    }

    /// Body of the spawned scrape task: extract, then cache or invalidate.
    async fn scrape_and_store(self, city: CitySlug) -> Result<Arc<WeatherSnapshot>> {
        let result = self.scrape(&city).await;

        if let Ok(mut inflight) = self.inflight.lock() {
            inflight.remove(city.cache_key());
        }
        result
    }

    async fn scrape(&self, city: &CitySlug) -> Result<Arc<WeatherSnapshot>> {
        let session = self.sessions.acquire().await?;

        match self.extractor.extract(session.as_ref(), city).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.cache.put(city, snapshot.clone());
                Ok(snapshot)
            }
            Err(e) => {
                warn!("Scrape failed for {}: {}", city, e);
                if matches!(e, ScrapeError::SessionClosed(_)) {
                    self.sessions.invalidate(&session).await;
                }
                Err(e)
            }
        }
    }

    /// Resolve several cities concurrently. Results keep input order.
    pub async fn resolve_many(&self, cities: &[CitySlug]) -> Vec<Result<Arc<WeatherSnapshot>>> {
        join_all(cities.iter().map(|city| self.resolve(city))).await
    }

    /// Close the shared browser session.
    pub async fn shutdown(&self) {
        self.sessions.shutdown().await;
    }
}
