//! Data models for weatherscrape.

mod city;
mod snapshot;

pub use city::CitySlug;
pub use snapshot::{flatten_markup, normalize_reading, RawSnapshot, SlBox, WeatherSnapshot};
