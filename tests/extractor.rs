//! Page extraction over stub DOM.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{city_url, extractor, forecast_page, test_settings, StubEngine, BLANK_PAGE};
use weatherscrape::browser::BrowserEngine;
use weatherscrape::models::CitySlug;
use weatherscrape::ScrapeError;

#[tokio::test]
async fn extracts_fields_from_rendered_page() {
    let engine = StubEngine::new().with_city("lahore", forecast_page("+72Â°F", "Clear sky"));
    let session = engine.launch().await.unwrap();
    let extractor = extractor(&test_settings());

    let snapshot = extractor
        .extract(session.as_ref(), &CitySlug::parse("Lahore").unwrap())
        .await
        .unwrap();

    assert_eq!(snapshot.weather_now_number.as_deref(), Some("+72"));
    assert_eq!(
        snapshot.weather_now_description.as_deref(),
        Some("<dt>Feels like</dt><dd>+72Â°F</dd>")
    );
    assert_eq!(snapshot.sun.as_deref(), Some("Sunrise 06:10"));
    assert_eq!(snapshot.dw_into.as_deref(), Some("Clear sky"));
    assert_eq!(snapshot.days_vertical_tabs.as_deref(), Some("<ul><li>Today</li></ul>"));
    assert_eq!(snapshot.icon_title.as_deref(), Some("Clear sky"));
    assert_eq!(snapshot.panes.len(), 2);
    assert_eq!(snapshot.sl_boxes.len(), 1);
    assert_eq!(snapshot.sl_boxes[0].sl_item_all_txt.as_deref(), Some("5 mph"));
    assert_eq!(engine.open_contexts(), 0);
}

#[tokio::test]
async fn missing_elements_are_absent() {
    let page = r#"<html><body><div id="weather-now-number">61</div></body></html>"#;
    let engine = StubEngine::new().with_city("quetta", page);
    let session = engine.launch().await.unwrap();

    let snapshot = extractor(&test_settings())
        .extract(session.as_ref(), &CitySlug::parse("quetta").unwrap())
        .await
        .unwrap();

    assert_eq!(snapshot.weather_now_number.as_deref(), Some("61"));
    assert_eq!(snapshot.sun, None);
    assert_eq!(snapshot.icon_html, None);
    assert!(snapshot.panes.is_empty());
    assert!(snapshot.sl_boxes.is_empty());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json.get("sun").is_none());
    assert_eq!(json["panes"], serde_json::json!([]));
}

#[tokio::test]
async fn selector_timeout_names_url_and_closes_context() {
    let engine = StubEngine::new().with_city("lahore", BLANK_PAGE);
    let session = engine.launch().await.unwrap();

    let err = extractor(&test_settings())
        .extract(session.as_ref(), &CitySlug::parse("lahore").unwrap())
        .await
        .err()
        .unwrap();

    match &err {
        ScrapeError::SelectorTimeout { url, selector, .. } => {
            assert_eq!(url, &city_url("lahore"));
            assert_eq!(selector, "#weather-now-number");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains(&city_url("lahore")));
    assert_eq!(engine.open_contexts(), 0);
}

#[tokio::test]
async fn unknown_page_is_navigation_error() {
    let engine = StubEngine::new();
    let session = engine.launch().await.unwrap();

    let err = extractor(&test_settings())
        .extract(session.as_ref(), &CitySlug::parse("atlantis").unwrap())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ScrapeError::Navigation { .. }));
    assert_eq!(engine.open_contexts(), 0);
}

#[tokio::test]
async fn slow_navigation_times_out() {
    let engine = StubEngine::new()
        .with_city("lahore", forecast_page("72", "Clear"))
        .with_navigation_delay(Duration::from_secs(10));
    let session = engine.launch().await.unwrap();

    let mut settings = test_settings();
    settings.scrape.navigation_timeout = 1;

    let err = extractor(&settings)
        .extract(session.as_ref(), &CitySlug::parse("lahore").unwrap())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ScrapeError::NavigationTimeout { .. }));
    assert_eq!(engine.open_contexts(), 0);
}

#[tokio::test]
async fn overall_timeout_cancels_and_closes_context() {
    let engine = Arc::new(
        StubEngine::new()
            .with_city("lahore", forecast_page("72", "Clear"))
            .with_navigation_delay(Duration::from_secs(10)),
    );
    let session = engine.launch().await.unwrap();

    let mut settings = test_settings();
    settings.scrape.navigation_timeout = 30;
    settings.scrape.timeout = 1;

    let err = extractor(&settings)
        .extract(session.as_ref(), &CitySlug::parse("lahore").unwrap())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ScrapeError::Timeout { .. }));
    assert_eq!(engine.open_contexts(), 0);
}

#[tokio::test]
async fn http_engine_extracts_served_markup() {
    use axum::{routing::get, Router};
    use weatherscrape::browser::HttpEngine;
    use weatherscrape::config::BrowserEngineConfig;

    let page = forecast_page("81Â°F", "Haze");
    let app = Router::new().route(
        "/forecast/pakistan/lahore/",
        get(move || {
            let page = page.clone();
            async move { axum::response::Html(page) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let mut settings = test_settings();
    settings.site.base_url = format!("http://{}", addr);

    let engine = HttpEngine::new(BrowserEngineConfig::default());
    let session = engine.launch().await.unwrap();
    let extractor = extractor(&settings);

    let snapshot = extractor
        .extract(session.as_ref(), &CitySlug::parse("lahore").unwrap())
        .await
        .unwrap();
    assert_eq!(snapshot.weather_now_number.as_deref(), Some("81"));
    assert_eq!(snapshot.dw_into.as_deref(), Some("Haze"));

    let err = extractor
        .extract(session.as_ref(), &CitySlug::parse("multan").unwrap())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ScrapeError::Navigation { .. }));
}
