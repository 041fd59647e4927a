//! Weather scrape handlers.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::super::error::ApiError;
use super::super::AppState;
use crate::error::ScrapeError;
use crate::models::{CitySlug, WeatherSnapshot};

/// Query parameters for the multi-city endpoint.
#[derive(Debug, Deserialize)]
pub struct CitiesParams {
    pub cities: Option<String>,
}

/// One slot of a multi-city response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CityResult {
    Data {
        city: String,
        data: WeatherSnapshot,
    },
    Error {
        city: String,
        error: String,
    },
}

/// `GET /scrape-weather/:city`
pub async fn scrape_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ApiError> {
    let slug = CitySlug::parse(&city)?;
    let snapshot = state.service.resolve(&slug).await?;
    Ok(Json(snapshot.as_ref()).into_response())
}

/// `GET /scrape-weather?cities=a,b,c`
///
/// Cities resolve concurrently; a failed city fills its own slot. The
/// request fails as a whole only when every city failed.
pub async fn scrape_cities(
    State(state): State<AppState>,
    Query(params): Query<CitiesParams>,
) -> Result<Response, ApiError> {
    let raw = params.cities.ok_or_else(|| {
        ScrapeError::InvalidRequest("Please provide a list of cities.".to_string())
    })?;
    let slugs = CitySlug::parse_list(&raw)?;

    let results = state.service.resolve_many(&slugs).await;

    if results.iter().all(|r| r.is_err()) {
        let errors: Vec<&ScrapeError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        // 503 only when nothing could get a session at all
        let error = errors
            .iter()
            .find(|e| !e.is_launch_failure())
            .or_else(|| errors.first())
            .copied();
        if let Some(error) = error {
            return Err(ApiError(error.clone()));
        }
    }

    let body: Vec<CityResult> = slugs
        .into_iter()
        .zip(results)
        .map(|(slug, result)| match result {
            Ok(snapshot) => CityResult::Data {
                city: slug.to_string(),
                data: snapshot.as_ref().clone(),
            },
            Err(e) => CityResult::Error {
                city: slug.to_string(),
                error: e.to_string(),
            },
        })
        .collect();

    Ok(Json(body).into_response())
}
