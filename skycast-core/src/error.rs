use thiserror::Error;

use crate::provider::ProviderError;

/// Errors surfaced to callers of the core.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing or malformed coordinates, query, or precondition input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Forward geocoding returned no matches.
    #[error("Location not found: {0}")]
    NotFound(String),

    /// Missing credential or a failed geocoding call.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The weather provider call failed.
    #[error("Upstream weather provider error: {0}")]
    Upstream(String),
}

impl WeatherError {
    /// Map a geocoding failure. Every cause is `ProviderUnavailable`.
    pub(crate) fn from_geocoding(err: ProviderError) -> Self {
        WeatherError::ProviderUnavailable(err.to_string())
    }

    /// Map a weather fetch failure. A missing key is a configuration
    /// problem, everything else is an upstream failure.
    pub(crate) fn from_weather(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingCredential => WeatherError::ProviderUnavailable(err.to_string()),
            other => WeatherError::Upstream(other.to_string()),
        }
    }

    /// Short message suitable for end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::InvalidInput(_) => "Please check the location or coordinates you entered.",
            WeatherError::NotFound(_) => "Location not found.",
            WeatherError::ProviderUnavailable(_) => {
                "Location service is unavailable. Check your API key and connection."
            }
            WeatherError::Upstream(_) => "Failed to fetch weather data. Please try again later.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_on_weather_fetch_is_provider_unavailable() {
        let err = WeatherError::from_weather(ProviderError::MissingCredential);
        assert!(matches!(err, WeatherError::ProviderUnavailable(_)));
    }

    #[test]
    fn status_error_on_weather_fetch_is_upstream() {
        let err = WeatherError::from_weather(ProviderError::Status {
            endpoint: "forecast",
            status: 502,
            body: "bad gateway".into(),
        });
        assert!(matches!(err, WeatherError::Upstream(_)));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn geocoding_errors_are_provider_unavailable() {
        let err = WeatherError::from_geocoding(ProviderError::Status {
            endpoint: "direct",
            status: 401,
            body: "invalid key".into(),
        });
        assert!(matches!(err, WeatherError::ProviderUnavailable(_)));
    }

    #[test]
    fn user_messages_are_not_empty() {
        for err in [
            WeatherError::InvalidInput("x".into()),
            WeatherError::NotFound("x".into()),
            WeatherError::ProviderUnavailable("x".into()),
            WeatherError::Upstream("x".into()),
        ] {
            assert!(!err.user_message().is_empty());
        }
    }
}
