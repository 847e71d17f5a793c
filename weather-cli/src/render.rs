use std::fmt::Write as _;

use weather_core::{ViewState, WeatherSnapshot, model::SearchLogListing};

pub const EMPTY_HINT: &str = "Type a city name to see the weather.";

/// Exactly one of: hint, loading line, error banner or weather card.
pub fn render_state(state: &ViewState) -> String {
    match state {
        ViewState::Idle => EMPTY_HINT.to_string(),
        ViewState::Loading => "Loading...".to_string(),
        ViewState::Failed(msg) => format!("Error: {msg}"),
        ViewState::Loaded(snapshot) => render_card(snapshot),
    }
}

pub fn render_card(s: &WeatherSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", s.location.display_name());
    let _ = writeln!(
        out,
        "  {:.1}\u{00b0}C ({:.1}\u{00b0}F), feels like {:.1}\u{00b0}C",
        s.temperature_c, s.temperature_f, s.feels_like_c
    );
    let _ = writeln!(out, "  {}", s.condition.text);
    let _ = writeln!(out, "  Humidity:   {}%", s.humidity_pct);
    let _ = writeln!(out, "  Wind:       {:.1} km/h {}", s.wind_kph, s.wind_dir);
    let _ = writeln!(out, "  Pressure:   {:.0} mb", s.pressure_mb);
    let _ = writeln!(out, "  UV index:   {:.1}", s.uv_index);
    let _ = writeln!(out, "  Visibility: {:.1} km", s.visibility_km);
    let _ = writeln!(out, "  Clouds:     {}%", s.cloud_pct);
    let _ = write!(out, "  Updated:    {}", s.last_updated.format("%Y-%m-%d %H:%M UTC"));
    out
}

pub fn render_logs(listing: &SearchLogListing) -> String {
    if listing.logs.is_empty() {
        return "No searches logged yet.".to_string();
    }

    let mut out = format!("{} logged search(es):\n", listing.count);
    for entry in &listing.logs {
        let _ = writeln!(out, "  {}  {}", entry.timestamp.to_rfc3339(), entry.city);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use weather_core::{
        SearchLogEntry,
        model::{Condition, Location},
    };

    fn london() -> WeatherSnapshot {
        WeatherSnapshot {
            location: Location {
                name: "London".into(),
                region: "City of London, Greater London".into(),
                country: "United Kingdom".into(),
            },
            temperature_c: 14.0,
            temperature_f: 57.2,
            feels_like_c: 13.1,
            condition: Condition { text: "Partly cloudy".into(), icon: String::new() },
            humidity_pct: 72,
            wind_kph: 15.1,
            wind_dir: "WSW".into(),
            pressure_mb: 1012.0,
            uv_index: 4.0,
            visibility_km: 10.0,
            cloud_pct: 50,
            last_updated: Utc.with_ymd_and_hms(2024, 5, 1, 9, 50, 0).unwrap(),
        }
    }

    #[test]
    fn idle_shows_hint_only() {
        assert_eq!(render_state(&ViewState::Idle), EMPTY_HINT);
    }

    #[test]
    fn failure_shows_banner() {
        let out = render_state(&ViewState::Failed("City not found".into()));
        assert_eq!(out, "Error: City not found");
    }

    #[test]
    fn card_lists_location_and_metrics() {
        let out = render_state(&ViewState::Loaded(london()));
        assert!(out.starts_with("London, City of London, Greater London, United Kingdom"));
        assert!(out.contains("14.0\u{00b0}C"));
        assert!(out.contains("Partly cloudy"));
        assert!(out.contains("Humidity:   72%"));
        assert!(out.contains("15.1 km/h WSW"));
        assert!(out.contains("2024-05-01 09:50 UTC"));
        assert!(!out.contains("Error"));
    }

    #[test]
    fn logs_render_in_order() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let listing = SearchLogListing {
            logs: vec![
                SearchLogEntry { city: "Lon".into(), timestamp: ts },
                SearchLogEntry { city: "Paris".into(), timestamp: ts },
            ],
            count: 2,
        };
        let out = render_logs(&listing);
        let lon = out.find("Lon").unwrap();
        let paris = out.find("Paris").unwrap();
        assert!(lon < paris);
        assert!(out.starts_with("2 logged"));
    }

    #[test]
    fn empty_logs_have_placeholder() {
        let listing = SearchLogListing { logs: vec![], count: 0 };
        assert_eq!(render_logs(&listing), "No searches logged yet.");
    }
}
