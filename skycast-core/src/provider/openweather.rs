use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    Config,
    model::{CurrentObservation, ForecastPayload, RawSample},
};

use super::{GeoPlace, GeocodingProvider, ProviderError, WeatherProvider};

/// OpenWeatherMap client for both weather and geocoding endpoints.
///
/// Built once and shared read-only. A missing API key is only reported
/// when a request is attempted.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    geo_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        geo_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: trim_slash(base_url.into()),
            geo_url: trim_slash(geo_url.into()),
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.api_key(),
            config.openweather.base_url.clone(),
            config.openweather.geo_url.clone(),
            Duration::from_secs(config.openweather.timeout_secs),
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: String,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        tracing::debug!(endpoint, "requesting OpenWeatherMap");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", api_key)])
            .send()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ProviderError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
    city: Option<OwCity>,
}

#[derive(Debug, Deserialize)]
struct OwGeoPlace {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl From<OwGeoPlace> for GeoPlace {
    fn from(p: OwGeoPlace) -> Self {
        GeoPlace {
            name: p.name,
            country: p.country,
            lat: p.lat,
            lon: p.lon,
        }
    }
}

fn first_weather(weather: Vec<OwWeather>) -> OwWeather {
    weather.into_iter().next().unwrap_or_default()
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentObservation, ProviderError> {
        let parsed: OwCurrentResponse = self
            .get_json(
                "weather",
                format!("{}/weather", self.base_url),
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("units", "metric".to_string()),
                ],
            )
            .await?;

        let weather = first_weather(parsed.weather);

        Ok(CurrentObservation {
            observed_at: unix_to_utc(parsed.dt).unwrap_or_else(Utc::now),
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like.unwrap_or(parsed.main.temp),
            humidity_pct: parsed.main.humidity,
            wind_speed_ms: parsed.wind.speed,
            visibility_m: parsed.visibility,
            pressure_hpa: parsed.main.pressure,
            condition_main: weather.main,
            condition_description: weather.description,
        })
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastPayload, ProviderError> {
        let parsed: OwForecastResponse = self
            .get_json(
                "forecast",
                format!("{}/forecast", self.base_url),
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("units", "metric".to_string()),
                ],
            )
            .await?;

        let samples = parsed
            .list
            .into_iter()
            .filter_map(|entry| {
                let Some(timestamp) = unix_to_utc(entry.dt) else {
                    tracing::warn!(dt = entry.dt, "skipping forecast entry with invalid timestamp");
                    return None;
                };
                let weather = first_weather(entry.weather);
                Some(RawSample {
                    timestamp,
                    temperature_c: entry.main.temp,
                    humidity_pct: entry.main.humidity,
                    wind_speed_ms: entry.wind.speed,
                    condition_main: weather.main,
                    condition_description: weather.description,
                    precipitation_mm: entry.rain.and_then(|r| r.three_hours),
                })
            })
            .collect();

        Ok(ForecastPayload {
            samples,
            utc_offset_secs: parsed.city.map(|c| c.timezone).unwrap_or(0),
        })
    }
}

#[async_trait]
impl GeocodingProvider for OpenWeatherClient {
    async fn direct(&self, query: &str, limit: usize) -> Result<Vec<GeoPlace>, ProviderError> {
        let places: Vec<OwGeoPlace> = self
            .get_json(
                "direct",
                format!("{}/direct", self.geo_url),
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(places.into_iter().map(GeoPlace::from).collect())
    }

    async fn reverse(
        &self,
        lat: f64,
        lon: f64,
        limit: usize,
    ) -> Result<Vec<GeoPlace>, ProviderError> {
        let places: Vec<OwGeoPlace> = self
            .get_json(
                "reverse",
                format!("{}/reverse", self.geo_url),
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        Ok(places.into_iter().map(GeoPlace::from).collect())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let out = truncate_body(&long);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn forecast_entry_decodes_rain_and_missing_weather() {
        let json = r#"{
            "list": [
                {"dt": 1718000000, "main": {"temp": 11.5, "humidity": 80},
                 "wind": {"speed": 3.2}, "rain": {"3h": 0.7}}
            ],
            "city": {"name": "Bergen", "country": "NO", "timezone": 7200}
        }"#;
        let parsed: OwForecastResponse = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.list.len(), 1);
        assert_eq!(parsed.list[0].rain.as_ref().and_then(|r| r.three_hours), Some(0.7));
        assert!(parsed.list[0].weather.is_empty());
        assert_eq!(parsed.city.map(|c| c.timezone), Some(7200));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = OpenWeatherClient::new(
            None,
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.fetch_current(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));

        let err = client.direct("Oslo", 1).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }
}
