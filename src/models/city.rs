//! City name normalization.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, ScrapeError};

/// URL-path-safe form of a city name, also used as the cache key.
///
/// Built from raw input by trimming, lower-casing, and turning spaces and
/// underscores into hyphens. `"Dera Ghazi_Khan"` becomes `"dera-ghazi-khan"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CitySlug(String);

impl CitySlug {
    pub fn parse(raw: &str) -> Result<Self> {
        let slug: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();

        if slug.is_empty() {
            return Err(ScrapeError::InvalidRequest(
                "city must not be empty".to_string(),
            ));
        }
        // Letters, digits and hyphens only, so the slug is always one plain path segment
        if !slug.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(ScrapeError::InvalidRequest(format!(
                "city '{}' may only contain letters, digits, spaces, '-' and '_'",
                raw.trim()
            )));
        }

        Ok(Self(slug))
    }

    /// Parse a comma-separated `cities` list, keeping input order.
    ///
    /// Blank entries are skipped. An empty result is an invalid request.
    pub fn parse_list(csv: &str) -> Result<Vec<Self>> {
        let slugs = csv
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect::<Result<Vec<_>>>()?;

        if slugs.is_empty() {
            return Err(ScrapeError::InvalidRequest(
                "query parameter 'cities' must name at least one city".to_string(),
            ));
        }
        Ok(slugs)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache key for this city.
    pub fn cache_key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CitySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
