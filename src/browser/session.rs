//! Process-wide browser session with lazy, single-flight initialization.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{BrowserEngine, BrowserSession};
use crate::error::{Result, ScrapeError};

/// Last failed launch, used to short-circuit callers during the cooldown.
struct LaunchFailure {
    at: Instant,
    error: ScrapeError,
}

#[derive(Default)]
struct SessionState {
    session: Option<Arc<dyn BrowserSession>>,
    last_failure: Option<LaunchFailure>,
}

/// Owns the single shared browser session.
///
/// The state lock is held across `launch`, so concurrent cold starts queue
/// behind one launch instead of racing to start several engines.
pub struct SessionManager {
    engine: Arc<dyn BrowserEngine>,
    state: Mutex<SessionState>,
    retry_cooldown: Duration,
    launches: AtomicU64,
    live: AtomicBool,
    shut_down: AtomicBool,
}

impl SessionManager {
    pub fn new(engine: Arc<dyn BrowserEngine>, retry_cooldown: Duration) -> Self {
        Self {
            engine,
            state: Mutex::new(SessionState::default()),
            retry_cooldown,
            launches: AtomicU64::new(0),
            live: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Return the live session, launching it on first use.
    pub async fn acquire(&self) -> Result<Arc<dyn BrowserSession>> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ScrapeError::ShuttingDown);
        }

        let mut state = self.state.lock().await;
        if let Some(session) = state.session.as_ref() {
            return Ok(session.clone());
        }

        if let Some(failure) = state.last_failure.as_ref() {
            if failure.at.elapsed() < self.retry_cooldown {
                debug!("Launch failed recently, not retrying yet");
                return Err(failure.error.clone());
            }
        }

        let attempt = self.launches.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Starting browser session (launch #{})", attempt);

        match self.engine.launch().await {
            Ok(session) => {
                state.session = Some(session.clone());
                state.last_failure = None;
                self.live.store(true, Ordering::SeqCst);
                Ok(session)
            }
            Err(e) => {
                let error = match e {
                    ScrapeError::Launch(_) => e,
                    other => ScrapeError::Launch(other.to_string()),
                };
                warn!("Browser launch failed: {}", error);
                state.last_failure = Some(LaunchFailure {
                    at: Instant::now(),
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Forget a session that reported itself dead so the next acquire relaunches.
    pub async fn invalidate(&self, dead: &Arc<dyn BrowserSession>) {
        let stale = {
            let mut state = self.state.lock().await;
            let is_current = state
                .session
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, dead));
            if is_current {
                self.live.store(false, Ordering::SeqCst);
                state.session.take()
            } else {
                None
            }
        };

        if let Some(session) = stale {
            warn!("Discarding dead browser session");
            if let Err(e) = session.close().await {
                debug!("Closing dead session failed: {}", e);
            }
        }
    }

    /// Close the session if one exists. Idempotent; later acquires fail.
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        let session = self.state.lock().await.session.take();
        self.live.store(false, Ordering::SeqCst);
        if let Some(session) = session {
            info!("Shutting down browser session");
            if let Err(e) = session.close().await {
                warn!("Browser shutdown failed: {}", e);
            }
        }
    }

    /// Number of launch attempts made so far.
    pub fn launches(&self) -> u64 {
        self.launches.load(Ordering::SeqCst)
    }

    /// Whether a session is up. Never waits on a launch in progress.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
