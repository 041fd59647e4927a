//! HTTP request handlers for the web server.

mod health;
mod weather;

pub use health::health;
pub use weather::{scrape_cities, scrape_city};
