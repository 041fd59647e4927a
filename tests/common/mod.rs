//! Stub browser engine serving fixed HTML per URL.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use weatherscrape::browser::{
    BrowserEngine, BrowserSession, ContextOptions, PageContext, SessionManager,
};
use weatherscrape::config::Settings;
use weatherscrape::models::RawSnapshot;
use weatherscrape::scrapers::{document_has_selector, extract_from_html, PageExtractor};
use weatherscrape::server::{create_router, AppState, WeatherCache};
use weatherscrape::services::WeatherService;
use weatherscrape::{Result, ScrapeError};

pub const BASE_URL: &str = "http://weather.test";

/// A forecast page with every extracted element present.
pub fn forecast_page(reading: &str, summary: &str) -> String {
    format!(
        r#"<html><body>
<div id="weather-now-number">{reading}</div>
<div id="weather-now-description"><dl><dt>Feels like</dt><dd>{reading}</dd></dl></div>
<div class="sun">Sunrise 06:10</div>
<div class="dw-into"> {summary} </div>
<div id="vertical_tabs"><ul>
<li>Today</li></ul></div>
<span id="weather-now-icon" title="{summary}"></span>
<div id="content-left"><div class="pane">p1</div><div class="pane">p2</div></div>
<div class="sl-box"><div class="sl-item"><span class="sl-item-txt">Wind</span><span class="sl-item-all-txt">5 mph</span></div></div>
</body></html>"#
    )
}

/// A page that never renders the readiness selector.
pub const BLANK_PAGE: &str = "<html><body><p>Loading...</p></body></html>";

pub fn city_url(slug: &str) -> String {
    format!("{}/forecast/pakistan/{}/", BASE_URL, slug)
}

#[derive(Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub contexts_opened: AtomicUsize,
    pub contexts_closed: AtomicUsize,
    pub extractions: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
struct StubBehavior {
    pages: HashMap<String, String>,
    dead_urls: Vec<String>,
    fail_launch: bool,
    launch_delay: Duration,
    navigation_delay: Duration,
    city_delays: HashMap<String, Duration>,
}

pub struct StubEngine {
    behavior: StubBehavior,
    pub counters: Arc<Counters>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            behavior: StubBehavior::default(),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_city(mut self, slug: &str, html: impl Into<String>) -> Self {
        self.behavior.pages.insert(city_url(slug), html.into());
        self
    }

    /// Navigating to this city reports the session connection as lost.
    pub fn with_dead_session_on(mut self, slug: &str) -> Self {
        self.behavior.dead_urls.push(city_url(slug));
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.behavior.fail_launch = true;
        self
    }

    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.behavior.launch_delay = delay;
        self
    }

    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.behavior.navigation_delay = delay;
        self
    }

    /// Navigation delay for one city, overriding the engine-wide one.
    pub fn with_city_delay(mut self, slug: &str, delay: Duration) -> Self {
        self.behavior.city_delays.insert(city_url(slug), delay);
        self
    }

    pub fn launches(&self) -> usize {
        Counters::get(&self.counters.launches)
    }

    pub fn extractions(&self) -> usize {
        Counters::get(&self.counters.extractions)
    }

    pub fn sessions_closed(&self) -> usize {
        Counters::get(&self.counters.sessions_closed)
    }

    /// Contexts opened and not yet closed.
    pub fn open_contexts(&self) -> usize {
        Counters::get(&self.counters.contexts_opened) - Counters::get(&self.counters.contexts_closed)
    }
}

#[async_trait]
impl BrowserEngine for StubEngine {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.behavior.launch_delay).await;
        if self.behavior.fail_launch {
            return Err(ScrapeError::Launch("stub: no browser installed".to_string()));
        }
        Ok(Arc::new(StubSession {
            behavior: Arc::new(self.behavior.clone()),
            counters: self.counters.clone(),
        }))
    }
}

struct StubSession {
    behavior: Arc<StubBehavior>,
    counters: Arc<Counters>,
}

#[async_trait]
impl BrowserSession for StubSession {
    async fn new_context(&self, _options: &ContextOptions) -> Result<Box<dyn PageContext>> {
        self.counters.contexts_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubPage {
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
            html: Mutex::new(None),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.counters.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct StubPage {
    behavior: Arc<StubBehavior>,
    counters: Arc<Counters>,
    html: Mutex<Option<String>>,
}

impl StubPage {
    fn html(&self) -> Result<String> {
        self.html
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ScrapeError::Browser("no page loaded".to_string()))
    }
}

#[async_trait]
impl PageContext for StubPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        if self.behavior.dead_urls.iter().any(|u| u == url) {
            return Err(ScrapeError::SessionClosed("stub: connection reset".to_string()));
        }

        let delay = self
            .behavior
            .city_delays
            .get(url)
            .copied()
            .unwrap_or(self.behavior.navigation_delay);
        if tokio::time::timeout(timeout, tokio::time::sleep(delay))
            .await
            .is_err()
        {
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            });
        }

        let html = self
            .behavior
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Navigation {
                url: url.to_string(),
                reason: "HTTP 404".to_string(),
            })?;
        *self.html.lock().unwrap() = Some(html);
        Ok(())
    }

    async fn has_selector(&self, selector: &str) -> Result<bool> {
        document_has_selector(&self.html()?, selector)
    }

    async fn extract(&self) -> Result<RawSnapshot> {
        self.counters.extractions.fetch_add(1, Ordering::SeqCst);
        Ok(extract_from_html(&self.html()?))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.counters.contexts_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Settings pointed at the stub site with short bounds.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.site.base_url = BASE_URL.to_string();
    settings.scrape.navigation_timeout = 2;
    settings.scrape.selector_timeout = 1;
    settings.scrape.selector_poll_ms = 20;
    settings.scrape.timeout = 5;
    settings
}

pub fn extractor(settings: &Settings) -> PageExtractor {
    PageExtractor::new(
        settings.site.clone(),
        settings.scrape.clone(),
        ContextOptions::from_config(&settings.browser),
    )
}

pub fn service_with(engine: Arc<StubEngine>, settings: &Settings) -> WeatherService {
    let sessions = SessionManager::new(engine, settings.browser.launch_retry_cooldown());
    WeatherService::new(
        Arc::new(WeatherCache::with_ttl(settings.cache.ttl())),
        Arc::new(sessions),
        Arc::new(extractor(settings)),
    )
}

pub fn router_with(engine: Arc<StubEngine>) -> axum::Router {
    create_router(AppState::new(service_with(engine, &test_settings())))
}
