//! Web server exposing the weather scrape endpoints.
//!
//! - `GET /scrape-weather/:city` - one city
//! - `GET /scrape-weather?cities=a,b,c` - several cities, in input order
//! - `GET /health` - session and cache status

mod cache;
mod error;
mod handlers;
mod routes;

pub use cache::WeatherCache;
pub use error::{ApiError, SCRAPE_FAILED};
pub use routes::create_router;

use std::net::SocketAddr;

use crate::services::WeatherService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: WeatherService,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self { service }
    }
}

/// Start the web server and run until Ctrl+C.
///
/// The browser session is closed once the listener has drained.
pub async fn serve(service: WeatherService, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(AppState::new(service.clone()));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    service.shutdown().await;
    result?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
