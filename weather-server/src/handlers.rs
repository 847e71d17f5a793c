use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use std::sync::Arc;

use weather_core::{
    WeatherSnapshot,
    model::{LogAck, SearchLogListing},
};

use crate::{
    AppState,
    api_error::{ApiError, CITY_REQUIRED},
};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable weather query");
        ApiError::BadRequest(CITY_REQUIRED.to_owned())
    })?;
    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest(CITY_REQUIRED.to_owned()))?;

    let snapshot = state.provider.current(city).await?;
    Ok(Json(snapshot))
}

/// Always answers 200; a bad body is reported as `success: false`.
pub async fn post_log(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Json<LogAck> {
    let city = match body {
        Ok(Json(value)) => value
            .get("city")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable search log body");
            None
        }
    };

    let Some(city) = city else {
        return Json(LogAck { success: false });
    };

    let entry = state.logs.write().await.push(&city);
    tracing::info!(city = %entry.city, timestamp = %entry.timestamp, "city searched");
    Json(LogAck { success: true })
}

pub async fn get_logs(State(state): State<Arc<AppState>>) -> Json<SearchLogListing> {
    let logs = state.logs.read().await.snapshot();
    let count = logs.len();
    Json(SearchLogListing { logs, count })
}
