//! Headless Chrome engine over CDP (chromiumoxide).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, NavigateParams, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::Handler;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::binary::find_chrome_executable;
use super::{release_context, BrowserEngine, BrowserSession, ContextOptions, PageContext};
use crate::config::BrowserEngineConfig;
use crate::error::{Result, ScrapeError};
use crate::models::RawSnapshot;
use crate::scrapers::EXTRACTION_SCRIPT;

/// Sub-resources aborted when resource blocking is on.
const BLOCKED_RESOURCES: &[ResourceType] = &[
    ResourceType::Image,
    ResourceType::Stylesheet,
    ResourceType::Font,
    ResourceType::Media,
];

/// Lifecycle event fired once the page has had no network activity for 500ms.
const NETWORK_IDLE: &str = "networkIdle";

/// Launches a local Chrome, or connects to a remote one.
pub struct ChromiumEngine {
    config: BrowserEngineConfig,
}

impl ChromiumEngine {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let chrome_path = find_chrome_executable(self.config.executable.as_deref())?;

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        builder
            .build()
            .map_err(|e| ScrapeError::Launch(format!("invalid browser config: {}", e)))
    }

    async fn connect_remote(&self, url: &str) -> Result<(Browser, Handler)> {
        info!("Connecting to remote browser at {}", url);

        // Resolve the WebSocket URL from the /json/version endpoint
        let version_url = devtools_version_url(url)?;

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .map_err(|e| ScrapeError::Launch(format!("remote browser unreachable: {}", e)))?
            .json()
            .await
            .map_err(|e| ScrapeError::Launch(format!("bad browser version info: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ScrapeError::Launch("no webSocketDebuggerUrl in response".to_string())
            })?;

        debug!("Connecting to WebSocket: {}", ws_url);
        Browser::connect(ws_url)
            .await
            .map_err(|e| ScrapeError::Launch(format!("failed to connect to {}: {}", ws_url, e)))
    }
}

/// `/json/version` endpoint of a DevTools server given as `ws://` or `http://`.
fn devtools_version_url(remote: &str) -> Result<String> {
    let mut url = url::Url::parse(remote)
        .map_err(|e| ScrapeError::Launch(format!("invalid browser URL {}: {}", remote, e)))?;

    let scheme = match url.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => {
            return Err(ScrapeError::Launch(format!(
                "unsupported browser URL scheme: {}",
                other
            )))
        }
    };
    if url.set_scheme(scheme).is_err() {
        return Err(ScrapeError::Launch(format!("invalid browser URL {}", remote)));
    }
    url.set_path("/json/version");
    url.set_query(None);
    Ok(url.to_string())
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>> {
        let remote = self.config.remote_url.is_some();
        let (browser, mut handler) = match self.config.remote_url.as_deref() {
            Some(url) => self.connect_remote(url).await?,
            None => {
                info!("Launching browser (headless={})", self.config.headless);
                let config = self.browser_config()?;
                Browser::launch(config)
                    .await
                    .map_err(|e| ScrapeError::Launch(format!("failed to launch browser: {}", e)))?
            }
        };

        let alive = Arc::new(AtomicBool::new(true));
        let handler_alive = alive.clone();
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser connection handler stopped: {}", e);
                    break;
                }
            }
            handler_alive.store(false, Ordering::SeqCst);
        });

        Ok(Arc::new(ChromiumSession {
            browser: Mutex::new(Some(browser)),
            handler_task,
            alive,
            remote,
        }))
    }
}

/// One shared Chrome process (or remote connection).
struct ChromiumSession {
    browser: Mutex<Option<Browser>>,
    handler_task: JoinHandle<()>,
    alive: Arc<AtomicBool>,
    remote: bool,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn PageContext>> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(ScrapeError::SessionClosed(
                "browser connection handler exited".to_string(),
            ));
        }

        let page = {
            let guard = self.browser.lock().await;
            let browser = guard.as_ref().ok_or(ScrapeError::ShuttingDown)?;
            browser.new_page("about:blank").await.map_err(cdp_error)?
        };

        // Wrap immediately so the page is closed even if setup fails
        let mut context = ChromiumPage {
            page,
            interceptor: None,
        };
        if let Err(e) = context.configure(options).await {
            release_context(Box::new(context), "about:blank").await;
            return Err(e);
        }

        Ok(Box::new(context))
    }

    async fn close(&self) -> Result<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        if self.remote {
            // Leave the remote browser running, just drop our connection
            debug!("Disconnecting from remote browser");
        } else {
            info!("Closing browser");
            if let Err(e) = browser.close().await {
                warn!("Browser close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Waiting for browser exit failed: {}", e);
            }
        }

        self.handler_task.abort();
        self.alive.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A single chromium tab.
struct ChromiumPage {
    page: Page,
    interceptor: Option<JoinHandle<()>>,
}

impl ChromiumPage {
    async fn configure(&mut self, options: &ContextOptions) -> Result<()> {
        self.page
            .execute(SetUserAgentOverrideParams::new(options.user_agent.clone()))
            .await
            .map_err(cdp_error)?;

        self.page
            .execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(cdp_error)?;

        if options.block_resources {
            self.block_resources().await?;
        }
        Ok(())
    }

    /// Pause matching sub-resource requests and fail every one of them.
    async fn block_resources(&mut self) -> Result<()> {
        let mut paused = self
            .page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(cdp_error)?;

        let patterns = BLOCKED_RESOURCES.iter().map(|kind| {
            RequestPattern::builder()
                .resource_type(kind.clone())
                .request_stage(RequestStage::Request)
                .build()
        });
        self.page
            .execute(EnableParams::builder().patterns(patterns).build())
            .await
            .map_err(cdp_error)?;

        let page = self.page.clone();
        self.interceptor = Some(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let fail =
                    FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
                if let Err(e) = page.execute(fail).await {
                    debug!("Could not abort {:?} request: {}", event.resource_type, e);
                }
            }
        }));
        Ok(())
    }
}

#[async_trait]
impl PageContext for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        let mut lifecycle = self
            .page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(cdp_error)?;

        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e,
            })?;

        let navigate = async {
            let response = self.page.execute(nav_params).await.map_err(|e| {
                ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            })?;

            if let Some(error) = response.result.error_text.clone() {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: error,
                });
            }

            let loader = response.result.loader_id.clone();
            while let Some(event) = lifecycle.next().await {
                let same_load = loader.as_ref().map_or(true, |id| *id == event.loader_id);
                if same_load && event.name == NETWORK_IDLE {
                    return Ok(());
                }
            }
            Err(ScrapeError::SessionClosed(
                "lifecycle event stream ended during navigation".to_string(),
            ))
        };

        tokio::time::timeout(timeout, navigate)
            .await
            .map_err(|_| ScrapeError::NavigationTimeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            })?
    }

    async fn has_selector(&self, selector: &str) -> Result<bool> {
        let quoted = serde_json::to_string(selector)
            .map_err(|e| ScrapeError::Browser(format!("bad selector {}: {}", selector, e)))?;
        let script = format!("document.querySelector({}) !== null", quoted);

        self.page
            .evaluate(script)
            .await
            .map_err(cdp_error)?
            .into_value::<bool>()
            .map_err(|e| ScrapeError::Browser(format!("selector check returned garbage: {}", e)))
    }

    async fn extract(&self) -> Result<RawSnapshot> {
        let url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        self.page
            .evaluate(EXTRACTION_SCRIPT.to_string())
            .await
            .map_err(|e| ScrapeError::Extraction {
                url: url.clone(),
                reason: e.to_string(),
            })?
            .into_value::<RawSnapshot>()
            .map_err(|e| ScrapeError::Extraction {
                url,
                reason: e.to_string(),
            })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumPage { page, interceptor } = *self;
        if let Some(task) = interceptor {
            task.abort();
        }
        page.close().await.map_err(cdp_error)
    }
}

fn cdp_error(e: CdpError) -> ScrapeError {
    match e {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            ScrapeError::SessionClosed(e.to_string())
        }
        other => ScrapeError::Browser(other.to_string()),
    }
}
