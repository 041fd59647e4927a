//! weatherscrape - headless-browser weather scraping service.
//!
//! Resolves a city name to a JSON snapshot of its forecast page, driving
//! one shared browser session and caching results in memory.

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod server;
pub mod services;

pub use error::{Result, ScrapeError};
