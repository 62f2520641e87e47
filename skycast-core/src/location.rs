//! Place name <-> coordinate resolution.
//!
//! Forward lookups are essential and fail loudly. Reverse lookups only
//! produce a display label, so they never fail and fall back to
//! [`UNKNOWN_LOCATION`] instead.

use std::sync::Arc;

use crate::error::WeatherError;
use crate::model::{LocationMatch, ResolvedLocation, UNKNOWN_LOCATION};
use crate::provider::GeocodingProvider;

/// Queries shorter than this return no suggestions.
pub const MIN_SEARCH_CHARS: usize = 2;

pub const DEFAULT_SEARCH_LIMIT: usize = 8;

#[derive(Debug, Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn GeocodingProvider>,
    search_limit: usize,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn GeocodingProvider>) -> Self {
        Self {
            geocoder,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Resolve a place name to its best match.
    pub async fn resolve_by_name(&self, query: &str) -> Result<ResolvedLocation, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::NotFound("empty location name".into()));
        }

        tracing::debug!(query, "geocoding location name");

        let place = self
            .geocoder
            .direct(query, 1)
            .await
            .map_err(|err| {
                tracing::warn!(query, error = %err, "forward geocoding failed");
                WeatherError::from_geocoding(err)
            })?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound(query.to_string()))?;

        Ok(ResolvedLocation {
            display_name: place.display_name(),
            lat: place.lat,
            lon: place.lon,
        })
    }

    /// Best-effort display name for a coordinate pair.
    pub async fn resolve_by_coordinates(&self, lat: f64, lon: f64) -> String {
        match self.geocoder.reverse(lat, lon, 1).await {
            Ok(places) => match places.into_iter().next() {
                Some(place) => place.display_name(),
                None => {
                    tracing::debug!(lat, lon, "reverse geocoding found no match");
                    UNKNOWN_LOCATION.to_string()
                }
            },
            Err(err) => {
                tracing::warn!(lat, lon, error = %err, "reverse geocoding failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    /// Autocomplete suggestions for `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationMatch>, WeatherError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }

        let places = self
            .geocoder
            .direct(query, self.search_limit)
            .await
            .map_err(WeatherError::from_geocoding)?;

        Ok(places
            .into_iter()
            .map(|place| LocationMatch {
                display_name: place.display_name(),
                country: place.country,
                lat: place.lat,
                lon: place.lon,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GeoPlace, ProviderError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        places: Vec<GeoPlace>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn with_places(places: Vec<GeoPlace>) -> Self {
            Self {
                places,
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn result(&self, limit: usize) -> Result<Vec<GeoPlace>, ProviderError> {
            if self.fail {
                return Err(ProviderError::MissingCredential);
            }
            Ok(self.places.iter().take(limit).cloned().collect())
        }
    }

    #[async_trait]
    impl GeocodingProvider for FakeGeocoder {
        async fn direct(&self, query: &str, limit: usize) -> Result<Vec<GeoPlace>, ProviderError> {
            self.calls.lock().unwrap().push(format!("direct:{query}:{limit}"));
            self.result(limit)
        }

        async fn reverse(
            &self,
            lat: f64,
            lon: f64,
            limit: usize,
        ) -> Result<Vec<GeoPlace>, ProviderError> {
            self.calls.lock().unwrap().push(format!("reverse:{lat}:{lon}:{limit}"));
            self.result(limit)
        }
    }

    fn place(name: &str, country: &str) -> GeoPlace {
        GeoPlace {
            name: name.into(),
            country: country.into(),
            lat: 51.5,
            lon: -0.12,
        }
    }

    fn resolver(geo: FakeGeocoder) -> (LocationResolver, Arc<FakeGeocoder>) {
        let geo = Arc::new(geo);
        (LocationResolver::new(geo.clone()), geo)
    }

    #[tokio::test]
    async fn resolve_by_name_uses_first_match() {
        let (r, geo) = resolver(FakeGeocoder::with_places(vec![
            place("London", "GB"),
            place("London", "CA"),
        ]));

        let loc = r.resolve_by_name(" London ").await.unwrap();

        assert_eq!(loc.display_name, "London, GB");
        assert_eq!(loc.lat, 51.5);
        assert_eq!(geo.calls(), vec!["direct:London:1"]);
    }

    #[tokio::test]
    async fn resolve_by_name_not_found() {
        let (r, _) = resolver(FakeGeocoder::default());
        let err = r.resolve_by_name("Nowhere").await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_by_empty_name_is_not_found_without_network() {
        let (r, geo) = resolver(FakeGeocoder::with_places(vec![place("X", "Y")]));
        let err = r.resolve_by_name("").await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(_)));
        assert!(geo.calls().is_empty());
    }

    #[tokio::test]
    async fn resolve_by_name_provider_failure_is_unavailable() {
        let (r, _) = resolver(FakeGeocoder::failing());
        let err = r.resolve_by_name("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn reverse_lookup_formats_name() {
        let (r, _) = resolver(FakeGeocoder::with_places(vec![place("Leeds", "GB")]));
        assert_eq!(r.resolve_by_coordinates(53.8, -1.5).await, "Leeds, GB");
    }

    #[tokio::test]
    async fn reverse_lookup_never_fails() {
        let (r, _) = resolver(FakeGeocoder::failing());
        assert_eq!(r.resolve_by_coordinates(0.0, 0.0).await, "Unknown Location");

        let (r, _) = resolver(FakeGeocoder::default());
        assert_eq!(r.resolve_by_coordinates(0.0, 0.0).await, "Unknown Location");
    }

    #[tokio::test]
    async fn short_search_skips_network() {
        let (r, geo) = resolver(FakeGeocoder::failing());
        assert!(r.search("a").await.unwrap().is_empty());
        assert!(r.search(" b ").await.unwrap().is_empty());
        assert!(r.search("").await.unwrap().is_empty());
        assert!(geo.calls().is_empty());
    }

    #[tokio::test]
    async fn search_uses_limit_and_maps_rows() {
        let places = (0..12).map(|i| place(&format!("Town{i}"), "DE")).collect();
        let (r, geo) = resolver(FakeGeocoder::with_places(places));

        let rows = r.search("Town").await.unwrap();

        assert_eq!(rows.len(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(rows[0].display_name, "Town0, DE");
        assert_eq!(rows[0].country, "DE");
        assert_eq!(geo.calls(), vec!["direct:Town:8"]);
    }

    #[tokio::test]
    async fn search_honours_custom_limit() {
        let places = (0..5).map(|i| place(&format!("Town{i}"), "DE")).collect();
        let geo = Arc::new(FakeGeocoder::with_places(places));
        let r = LocationResolver::new(geo.clone()).with_search_limit(3);

        assert_eq!(r.search("To").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_failure_is_surfaced() {
        let (r, _) = resolver(FakeGeocoder::failing());
        let err = r.search("Paris").await.unwrap_err();
        assert!(matches!(err, WeatherError::ProviderUnavailable(_)));
    }
}
