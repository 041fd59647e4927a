//! Web server command.

use console::style;

use crate::cli::icons::arrow;
use crate::config::Settings;
use crate::services::WeatherService;

const DEFAULT_PORT: u16 = 3000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or(&settings.server.bind);
    let (host, port) = parse_bind_address(bind)?;

    println!(
        "{} Engine: {} ({})",
        arrow(),
        settings.browser.engine,
        settings
            .browser
            .remote_url
            .as_deref()
            .unwrap_or("local launch")
    );
    println!(
        "{} Starting weatherscrape at http://{}:{}",
        arrow(),
        host,
        port
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let service = WeatherService::from_settings(settings);
    crate::server::serve(service, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3000" -> 0.0.0.0:3000
/// - Just a host: "127.0.0.1" -> 127.0.0.1:3000
/// - Host and port: "127.0.0.1:8080" -> 127.0.0.1:8080
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("0.0.0.0".to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
        if !host.is_empty() && !host.contains(':') {
            anyhow::bail!("Invalid port in bind address: {}", bind);
        }
    }

    Ok((bind.to_string(), DEFAULT_PORT))
}
