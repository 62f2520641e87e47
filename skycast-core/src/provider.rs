use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{CurrentObservation, ForecastPayload};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Failures of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OpenWeatherMap API key not configured")]
    MissingCredential,

    #[error("Failed to send request to provider ({endpoint}): {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse provider {endpoint} JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A place known to the geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPlace {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoPlace {
    /// "Name, Country" label shown to users.
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentObservation, ProviderError>;

    /// 3-hourly samples, at most five days ahead.
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, ProviderError>;
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    /// Forward search by free-text name.
    async fn direct(&self, query: &str, limit: usize) -> Result<Vec<GeoPlace>, ProviderError>;

    async fn reverse(&self, lat: f64, lon: f64, limit: usize)
    -> Result<Vec<GeoPlace>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_country() {
        let place = GeoPlace {
            name: "Bergen".into(),
            country: "NO".into(),
            lat: 60.39,
            lon: 5.32,
        };
        assert_eq!(place.display_name(), "Bergen, NO");
    }

    #[test]
    fn display_name_without_country() {
        let place = GeoPlace {
            name: "Atlantis".into(),
            country: String::new(),
            lat: 0.0,
            lon: 0.0,
        };
        assert_eq!(place.display_name(), "Atlantis");
    }

    #[test]
    fn status_error_message_mentions_endpoint() {
        let err = ProviderError::Status {
            endpoint: "weather",
            status: 401,
            body: "Invalid API key".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("weather"));
        assert!(msg.contains("401"));
    }
}
