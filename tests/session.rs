//! Session manager lifecycle against a stub engine.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use common::{forecast_page, service_with, test_settings, StubEngine};
use weatherscrape::browser::SessionManager;
use weatherscrape::models::CitySlug;
use weatherscrape::ScrapeError;

#[tokio::test]
async fn concurrent_cold_start_launches_once() {
    let engine = Arc::new(StubEngine::new().with_launch_delay(Duration::from_millis(50)));
    let manager = Arc::new(SessionManager::new(engine.clone(), Duration::from_secs(30)));

    let sessions = join_all((0..16).map(|_| {
        let manager = manager.clone();
        tokio::spawn(async move { manager.acquire().await })
    }))
    .await;

    let sessions: Vec<_> = sessions
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(engine.launches(), 1);
    assert_eq!(manager.launches(), 1);
    assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
    assert!(manager.is_live());
}

#[tokio::test]
async fn failed_launch_is_replayed_during_cooldown() {
    let engine = Arc::new(StubEngine::new().failing_launch());
    let manager = SessionManager::new(engine.clone(), Duration::from_secs(60));

    for _ in 0..3 {
        let err = manager.acquire().await.err().unwrap();
        assert!(matches!(err, ScrapeError::Launch(_)));
    }
    assert_eq!(engine.launches(), 1);
    assert!(!manager.is_live());
}

#[tokio::test]
async fn failed_launch_retries_after_cooldown() {
    let engine = Arc::new(StubEngine::new().failing_launch());
    let manager = SessionManager::new(engine.clone(), Duration::ZERO);

    assert!(manager.acquire().await.is_err());
    assert!(manager.acquire().await.is_err());
    assert_eq!(engine.launches(), 2);
}

#[tokio::test]
async fn shutdown_is_idempotent_and_final() {
    let engine = Arc::new(StubEngine::new());
    let manager = SessionManager::new(engine.clone(), Duration::from_secs(30));

    manager.acquire().await.unwrap();
    manager.shutdown().await;
    manager.shutdown().await;

    assert_eq!(engine.sessions_closed(), 1);
    assert!(!manager.is_live());
    assert!(matches!(
        manager.acquire().await,
        Err(ScrapeError::ShuttingDown)
    ));
    assert_eq!(engine.launches(), 1);
}

#[tokio::test]
async fn shutdown_without_session_is_a_no_op() {
    let engine = Arc::new(StubEngine::new());
    let manager = SessionManager::new(engine.clone(), Duration::from_secs(30));

    manager.shutdown().await;
    assert_eq!(engine.launches(), 0);
    assert_eq!(engine.sessions_closed(), 0);
}

#[tokio::test]
async fn dead_session_is_relaunched() {
    let engine = Arc::new(
        StubEngine::new()
            .with_dead_session_on("quetta")
            .with_city("lahore", forecast_page("72", "Clear")),
    );
    let service = service_with(engine.clone(), &test_settings());

    let quetta = CitySlug::parse("quetta").unwrap();
    let err = service.resolve(&quetta).await.err().unwrap();
    assert!(matches!(err, ScrapeError::SessionClosed(_)));
    assert_eq!(engine.sessions_closed(), 1);
    assert!(!service.sessions().is_live());

    let lahore = CitySlug::parse("lahore").unwrap();
    service.resolve(&lahore).await.unwrap();
    assert_eq!(engine.launches(), 2);
    assert_eq!(engine.open_contexts(), 0);
}
