//! Service layer for weatherscrape.
//!
//! Domain logic separated from the HTTP surface, shared by the server and
//! the one-shot CLI command.

pub mod weather;

pub use weather::WeatherService;
