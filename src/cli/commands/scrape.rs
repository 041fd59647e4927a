//! One-shot scrape command.

use console::style;

use crate::cli::icons::{error, success};
use crate::config::Settings;
use crate::models::CitySlug;
use crate::services::WeatherService;

/// Scrape the given cities once and print a JSON array to stdout.
///
/// Progress and failures go to stderr so stdout stays machine-readable.
pub async fn cmd_scrape(settings: &Settings, cities: &[String], pretty: bool) -> anyhow::Result<()> {
    let slugs = CitySlug::parse_list(&cities.join(","))?;

    let service = WeatherService::from_settings(settings);
    let results = service.resolve_many(&slugs).await;
    service.shutdown().await;

    let mut output = Vec::with_capacity(results.len());
    let mut failures = 0;

    for (slug, result) in slugs.iter().zip(results) {
        match result {
            Ok(snapshot) => {
                eprintln!("{} {}", success(), slug);
                output.push(serde_json::json!({ "city": slug, "data": snapshot.as_ref() }));
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {}", error(), slug, style(&e).dim());
                output.push(serde_json::json!({ "city": slug, "error": e.to_string() }));
            }
        }
    }

    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    if failures == slugs.len() {
        anyhow::bail!("All {} cities failed to scrape", failures);
    }

    Ok(())
}
