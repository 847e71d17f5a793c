//! Typed API error for HTTP handlers.
//!
//! Renders as `{"error": "message"}` with the matching status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use weather_core::{ProviderError, model::ErrorBody};

pub const CITY_REQUIRED: &str = "City parameter is required";
pub const FETCH_FAILED: &str = "Failed to fetch weather data";

#[derive(Debug)]
pub enum ApiError {
    /// 400, missing input or a city the provider cannot resolve.
    BadRequest(String),
    /// 500. The cause is logged, the client only gets a generic message.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "weather lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED.to_owned())
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.into()),
        }
    }
}
