use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{CITY_NOT_FOUND, ProviderError},
    model::{Condition, Location, WeatherSnapshot},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http })
    }

    /// Point the provider at a different host, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, ProviderError> {
        let url = format!("{}/current.json", self.base_url);

        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        parse_current(status, &body)
    }
}

/// Turn a raw `current.json` reply into a snapshot or a classified error.
pub(crate) fn parse_current(status: StatusCode, body: &str) -> Result<WeatherSnapshot, ProviderError> {
    if status == StatusCode::BAD_REQUEST {
        // 400 is how WeatherAPI reports an unresolvable `q`.
        let message = serde_json::from_str::<WaErrorResponse>(body)
            .ok()
            .map(|e| e.error.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| CITY_NOT_FOUND.to_string());
        return Err(ProviderError::NotFound(message));
    }

    if !status.is_success() {
        return Err(ProviderError::Upstream {
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }

    let parsed: WaResponse = serde_json::from_str(body)?;

    let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
    let last_updated = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

    Ok(WeatherSnapshot {
        location: Location {
            name: parsed.location.name,
            region: parsed.location.region,
            country: parsed.location.country,
        },
        temperature_c: parsed.current.temp_c,
        temperature_f: parsed.current.temp_f,
        feels_like_c: parsed.current.feelslike_c,
        condition: Condition {
            text: parsed.current.condition.text,
            icon: absolute_icon_url(&parsed.current.condition.icon),
        },
        humidity_pct: parsed.current.humidity,
        wind_kph: parsed.current.wind_kph,
        wind_dir: parsed.current.wind_dir,
        pressure_mb: parsed.current.pressure_mb,
        uv_index: parsed.current.uv,
        visibility_km: parsed.current.vis_km,
        cloud_pct: parsed.current.cloud,
        last_updated,
    })
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    #[serde(default)]
    wind_dir: String,
    pressure_mb: f64,
    uv: f64,
    vis_km: f64,
    cloud: u8,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorDetail,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, ProviderError> {
        self.fetch_current(city).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

// WeatherAPI returns protocol-relative icon paths ("//cdn.weatherapi.com/...").
fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("//") { format!("https:{icon}") } else { icon.to_string() }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
