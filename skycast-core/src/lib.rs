//! Core library for `skycast`.
//!
//! This crate defines:
//! - Classification of provider conditions into a canonical vocabulary
//! - Aggregation of 3-hourly samples into daily summaries
//! - Extension of the 5-day provider forecast to a full week
//! - Location resolution and the [`WeatherFacade`] tying it together
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod condition;
pub mod config;
pub mod error;
pub mod facade;
pub mod location;
pub mod model;
pub mod provider;
pub mod synth;

pub use aggregate::DailyAggregator;
pub use condition::CanonicalCondition;
pub use config::Config;
pub use error::WeatherError;
pub use facade::WeatherFacade;
pub use location::LocationResolver;
pub use model::{
    Coordinates, CurrentWeather, DailyAggregate, ForecastDay, ForecastReport, LocationMatch,
    RawSample, ResolvedLocation, WeatherQuery, WeatherReport,
};
pub use provider::{GeocodingProvider, OpenWeatherClient, WeatherProvider};
pub use synth::{ForecastSynthesizer, RandomSource, RngSource};
