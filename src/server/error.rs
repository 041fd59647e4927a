//! Conversion of scrape failures into JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ScrapeError;

/// Generic message returned for any failed extraction.
pub const SCRAPE_FAILED: &str = "Failed to scrape weather data.";

/// Error returned by the weather handlers.
#[derive(Debug)]
pub struct ApiError(pub ScrapeError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

impl From<ScrapeError> for ApiError {
    fn from(e: ScrapeError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if self.0.is_invalid_request() {
            json!({ "error": self.0.to_string() })
        } else {
            json!({ "error": SCRAPE_FAILED, "details": self.0.to_string() })
        };
        (status, Json(body)).into_response()
    }
}

/// HTTP status for a scrape error.
pub fn status_for(error: &ScrapeError) -> StatusCode {
    if error.is_invalid_request() {
        StatusCode::BAD_REQUEST
    } else if error.is_launch_failure() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
