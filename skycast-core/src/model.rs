use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::CanonicalCondition;
use crate::error::WeatherError;

/// Display name used whenever reverse geocoding yields nothing.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// One provider forecast sample (3-hourly).
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub condition_main: String,
    pub condition_description: String,
    /// Rain accumulated over the 3h window, if the provider reported any.
    pub precipitation_mm: Option<f64>,
}

/// Single-day reduction of the samples that fall on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    /// Weekday label, e.g. "Mon".
    pub day: String,
    pub high_c: i32,
    pub low_c: i32,
    pub condition: CanonicalCondition,
    /// Accumulated precipitation scaled into 0..=100. Not a probability.
    pub precipitation_pct: u8,
    pub wind_speed_kmh: u32,
    pub humidity_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    #[serde(flatten)]
    pub day: DailyAggregate,
    /// `true` when the day was extrapolated rather than provided.
    pub synthetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Validate latitude/longitude ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, WeatherError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(WeatherError::InvalidInput(format!(
                "Latitude must be between -90 and 90, got {lat}"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::InvalidInput(format!(
                "Longitude must be between -180 and 180, got {lon}"
            )));
        }
        Ok(Self { lat, lon })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Autocomplete row returned by location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMatch {
    pub display_name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Current-conditions payload as delivered by a weather provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentObservation {
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub visibility_m: Option<f64>,
    pub pressure_hpa: f64,
    pub condition_main: String,
    pub condition_description: String,
}

/// Forecast payload as delivered by a weather provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPayload {
    pub samples: Vec<RawSample>,
    /// Offset of the forecast location from UTC, in seconds.
    pub utc_offset_secs: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: String,
    pub coordinates: Coordinates,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: i32,
    pub feels_like_c: i32,
    pub condition: CanonicalCondition,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_kmh: u32,
    pub visibility_km: Option<u32>,
    pub pressure_hpa: u32,
    pub dew_point_c: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub location: String,
    pub coordinates: Coordinates,
    pub forecast: Vec<ForecastDay>,
}

/// Current conditions and forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub coordinates: Coordinates,
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

/// What a caller asks weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Place(String),
    Coordinates {
        lat: f64,
        lon: f64,
        display_name_hint: Option<String>,
    },
}

impl WeatherQuery {
    /// Build a query from optional parts. Coordinates win over a place name,
    /// which then serves as the display name.
    pub fn from_parts(
        place: Option<String>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Self, WeatherError> {
        let place = place.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());

        match (lat, lon, place) {
            (Some(lat), Some(lon), hint) => Ok(WeatherQuery::Coordinates {
                lat,
                lon,
                display_name_hint: hint,
            }),
            (None, None, Some(place)) => Ok(WeatherQuery::Place(place)),
            (Some(_), None, _) | (None, Some(_), _) => Err(WeatherError::InvalidInput(
                "Latitude and longitude are required together".into(),
            )),
            (None, None, None) => Err(WeatherError::InvalidInput(
                "Location or coordinates required".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn query_from_coordinates_keeps_place_as_hint() {
        let q = WeatherQuery::from_parts(Some("Home".into()), Some(1.0), Some(2.0)).unwrap();
        assert_eq!(
            q,
            WeatherQuery::Coordinates {
                lat: 1.0,
                lon: 2.0,
                display_name_hint: Some("Home".into())
            }
        );
    }

    #[test]
    fn query_from_place() {
        let q = WeatherQuery::from_parts(Some("  Oslo ".into()), None, None).unwrap();
        assert_eq!(q, WeatherQuery::Place("Oslo".into()));
    }

    #[test]
    fn query_requires_something() {
        let err = WeatherQuery::from_parts(Some("   ".into()), None, None).unwrap_err();
        assert!(err.to_string().contains("Location or coordinates required"));

        let err = WeatherQuery::from_parts(None, Some(1.0), None).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidInput(_)));
    }

    #[test]
    fn forecast_day_serializes_flat() {
        let day = ForecastDay {
            day: DailyAggregate {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                day: "Fri".into(),
                high_c: 12,
                low_c: 4,
                condition: CanonicalCondition::Cloudy,
                precipitation_pct: 20,
                wind_speed_kmh: 14,
                humidity_pct: 70,
            },
            synthetic: true,
        };
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["high_c"], 12);
        assert_eq!(json["condition"], "cloudy");
        assert_eq!(json["synthetic"], true);
    }
}
