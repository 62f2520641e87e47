use std::sync::Arc;

use crate::Config;
use crate::aggregate::{DailyAggregator, clamp_pct, round_half_up};
use crate::condition::CanonicalCondition;
use crate::error::WeatherError;
use crate::location::LocationResolver;
use crate::model::{
    Coordinates, CurrentObservation, CurrentWeather, ForecastDay, ForecastPayload, ForecastReport,
    LocationMatch, WeatherQuery, WeatherReport,
};
use crate::provider::{GeocodingProvider, OpenWeatherClient, ProviderError, WeatherProvider};
use crate::synth::{ForecastSynthesizer, RngSource};

/// Entry point for weather queries.
///
/// Construct once at startup and share; it holds no per-request state.
#[derive(Debug, Clone)]
pub struct WeatherFacade {
    weather: Arc<dyn WeatherProvider>,
    resolver: LocationResolver,
    synthesizer: ForecastSynthesizer,
    synthesis_seed: Option<u64>,
}

impl WeatherFacade {
    pub fn new(weather: Arc<dyn WeatherProvider>, geocoder: Arc<dyn GeocodingProvider>) -> Self {
        Self {
            weather,
            resolver: LocationResolver::new(geocoder),
            synthesizer: ForecastSynthesizer::default(),
            synthesis_seed: None,
        }
    }

    /// Facade backed by OpenWeatherMap for both weather and geocoding.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let client = OpenWeatherClient::from_config(config).map_err(|err| {
            WeatherError::ProviderUnavailable(format!("Failed to build HTTP client: {err}"))
        })?;
        let client = Arc::new(client);

        Ok(Self::new(client.clone(), client)
            .with_forecast_days(config.forecast.days)
            .with_search_limit(config.forecast.search_limit))
    }

    pub fn with_forecast_days(mut self, days: usize) -> Self {
        self.synthesizer = ForecastSynthesizer::new(days.max(1));
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.resolver = self.resolver.with_search_limit(limit);
        self
    }

    /// Make synthetic forecast days reproducible.
    pub fn with_synthesis_seed(mut self, seed: u64) -> Self {
        self.synthesis_seed = Some(seed);
        self
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub async fn get_current_weather(
        &self,
        lat: f64,
        lon: f64,
        display_name_hint: Option<&str>,
    ) -> Result<CurrentWeather, WeatherError> {
        let coords = Coordinates::new(lat, lon)?;

        let (location, current) = tokio::join!(
            self.display_name(coords, display_name_hint),
            self.weather.fetch_current(coords.lat, coords.lon),
        );
        let current = current.map_err(|err| upstream(coords, err))?;

        Ok(build_current(location, coords, current))
    }

    pub async fn get_forecast(
        &self,
        lat: f64,
        lon: f64,
        display_name_hint: Option<&str>,
    ) -> Result<ForecastReport, WeatherError> {
        let coords = Coordinates::new(lat, lon)?;

        let (location, payload) = tokio::join!(
            self.display_name(coords, display_name_hint),
            self.weather.fetch_forecast(coords.lat, coords.lon),
        );
        let payload = payload.map_err(|err| upstream(coords, err))?;

        Ok(ForecastReport {
            location,
            coordinates: coords,
            forecast: self.build_forecast(payload)?,
        })
    }

    /// Current conditions and forecast for a place name or coordinates.
    pub async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let (coords, hint) = match query {
            WeatherQuery::Place(name) => {
                let resolved = self.resolver.resolve_by_name(name).await?;
                (
                    Coordinates::new(resolved.lat, resolved.lon)?,
                    Some(resolved.display_name),
                )
            }
            WeatherQuery::Coordinates {
                lat,
                lon,
                display_name_hint,
            } => (Coordinates::new(*lat, *lon)?, display_name_hint.clone()),
        };

        let (location, current, payload) = tokio::join!(
            self.display_name(coords, hint.as_deref()),
            self.weather.fetch_current(coords.lat, coords.lon),
            self.weather.fetch_forecast(coords.lat, coords.lon),
        );
        let current = current.map_err(|err| upstream(coords, err))?;
        let payload = payload.map_err(|err| upstream(coords, err))?;

        Ok(WeatherReport {
            current: build_current(location.clone(), coords, current),
            forecast: self.build_forecast(payload)?,
            location,
            coordinates: coords,
        })
    }

    pub async fn search_locations(&self, query: &str) -> Result<Vec<LocationMatch>, WeatherError> {
        self.resolver.search(query).await
    }

    async fn display_name(&self, coords: Coordinates, hint: Option<&str>) -> String {
        match hint.map(str::trim).filter(|h| !h.is_empty()) {
            Some(hint) => hint.to_string(),
            None => self.resolver.resolve_by_coordinates(coords.lat, coords.lon).await,
        }
    }

    fn build_forecast(&self, payload: ForecastPayload) -> Result<Vec<ForecastDay>, WeatherError> {
        let days = DailyAggregator::with_offset_secs(payload.utc_offset_secs)
            .aggregate(&payload.samples);

        if days.is_empty() {
            return Err(WeatherError::Upstream(
                "forecast response contained no data".into(),
            ));
        }

        match self.synthesis_seed {
            Some(seed) => self.synthesizer.extend(&days, &mut RngSource::seeded(seed)),
            None => self.synthesizer.extend(&days, &mut RngSource::thread()),
        }
    }
}

fn upstream(coords: Coordinates, err: ProviderError) -> WeatherError {
    tracing::warn!(lat = coords.lat, lon = coords.lon, error = %err, "weather provider call failed");
    WeatherError::from_weather(err)
}

fn build_current(location: String, coords: Coordinates, obs: CurrentObservation) -> CurrentWeather {
    let dew_point = obs.temperature_c - (100.0 - obs.humidity_pct) / 5.0;

    CurrentWeather {
        location,
        coordinates: coords,
        observed_at: obs.observed_at,
        temperature_c: round_half_up(obs.temperature_c) as i32,
        feels_like_c: round_half_up(obs.feels_like_c) as i32,
        condition: CanonicalCondition::classify(&obs.condition_main, &obs.condition_description),
        description: obs.condition_description,
        humidity_pct: clamp_pct(round_half_up(obs.humidity_pct)),
        wind_speed_kmh: round_half_up(obs.wind_speed_ms * 3.6).max(0) as u32,
        visibility_km: obs
            .visibility_m
            .map(|m| round_half_up(m / 1000.0).max(0) as u32),
        pressure_hpa: round_half_up(obs.pressure_hpa).max(0) as u32,
        dew_point_c: round_half_up(dew_point) as i32,
    }
}
