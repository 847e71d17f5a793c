use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a snapshot was observed, as resolved by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
}

impl Location {
    /// "London, City of London, United Kingdom", skipping empty parts.
    pub fn display_name(&self) -> String {
        [self.name.as_str(), self.region.as_str(), self.country.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Absolute icon URL.
    pub icon: String,
}

/// Current conditions for one city. Produced once per successful lookup and
/// replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub temperature_c: f64,
    pub temperature_f: f64,
    pub feels_like_c: f64,
    pub condition: Condition,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub uv_index: f64,
    pub visibility_km: f64,
    pub cloud_pct: u8,
    pub last_updated: DateTime<Utc>,
}

/// One recorded search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub city: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRequest {
    pub city: String,
}

/// Reply to `POST /api/log`. Always sent with status 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogAck {
    pub success: bool,
}

/// Reply to `GET /api/log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLogListing {
    pub logs: Vec<SearchLogEntry>,
    pub count: usize,
}

/// `{"error": "..."}` body used by the lookup endpoint for 4xx/5xx replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
