use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use skycast_core::{Config, WeatherError, WeatherFacade, WeatherQuery};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and 7-day forecasts")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where to get weather for.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Place name, e.g. "Oslo" or "Springfield, US".
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub place: Option<String>,

    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Display name to show instead of reverse geocoding the coordinates.
    #[arg(long, requires = "lat")]
    pub name: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure {
        /// Key to store; prompted for when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show current conditions.
    Current {
        #[command(flatten)]
        location: LocationArgs,

        #[arg(long)]
        json: bool,
    },

    /// Show the 7-day forecast.
    Forecast {
        #[command(flatten)]
        location: LocationArgs,

        /// Seed for the extrapolated days beyond the provider horizon.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// Show current conditions and the forecast together.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// Search for places by name.
    Search {
        query: String,

        #[arg(long)]
        json: bool,
    },
}

impl LocationArgs {
    fn query(&self) -> Result<WeatherQuery, WeatherError> {
        let label = self.place.clone().or_else(|| self.name.clone());
        WeatherQuery::from_parts(label, self.lat, self.lon)
    }

    /// Coordinates plus display name, geocoding a place name if needed.
    async fn resolve(
        &self,
        facade: &WeatherFacade,
    ) -> Result<(f64, f64, Option<String>), WeatherError> {
        match self.query()? {
            WeatherQuery::Place(name) => {
                let resolved = facade.resolver().resolve_by_name(&name).await?;
                Ok((resolved.lat, resolved.lon, Some(resolved.display_name)))
            }
            WeatherQuery::Coordinates {
                lat,
                lon,
                display_name_hint,
            } => Ok((lat, lon, display_name_hint)),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => configure(api_key),
            Command::Current { location, json } => {
                let facade = build_facade(None)?;
                let (lat, lon, hint) = location.resolve(&facade).await.map_err(report)?;
                let current = facade
                    .get_current_weather(lat, lon, hint.as_deref())
                    .await
                    .map_err(report)?;

                emit(json, &current, output::print_current)
            }
            Command::Forecast {
                location,
                seed,
                json,
            } => {
                let facade = build_facade(seed)?;
                let (lat, lon, hint) = location.resolve(&facade).await.map_err(report)?;
                let forecast = facade
                    .get_forecast(lat, lon, hint.as_deref())
                    .await
                    .map_err(report)?;

                emit(json, &forecast, output::print_forecast_report)
            }
            Command::Show {
                location,
                seed,
                json,
            } => {
                let facade = build_facade(seed)?;
                let query = location.query().map_err(report)?;
                let weather = facade.get_weather(&query).await.map_err(report)?;

                emit(json, &weather, output::print_weather_report)
            }
            Command::Search { query, json } => {
                let facade = build_facade(None)?;
                let matches = facade.search_locations(&query).await.map_err(report)?;

                emit(json, &matches, |m| output::print_matches(m))
            }
        }
    }
}

fn configure(api_key: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = match api_key {
        Some(key) => key,
        None => inquire::Password::new("OpenWeatherMap API key:")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    config.set_api_key(api_key);
    if config.openweather.api_key.is_none() {
        return Err(anyhow!("API key must not be empty"));
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn build_facade(seed: Option<u64>) -> anyhow::Result<WeatherFacade> {
    let config = Config::load()?;
    if !config.is_configured() {
        tracing::warn!(
            "no API key configured; run `skycast configure` or set {}",
            skycast_core::config::API_KEY_ENV
        );
    }

    let facade = WeatherFacade::from_config(&config).map_err(report)?;
    Ok(match seed {
        Some(seed) => facade.with_synthesis_seed(seed),
        None => facade,
    })
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{text}");
    } else {
        human(value);
    }
    Ok(())
}

fn report(err: WeatherError) -> anyhow::Error {
    anyhow!("{}\n  {err}", err.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "skycast", "current", "--lat", "-33.87", "--lon", "151.21",
        ])
        .unwrap();

        match cli.command {
            Command::Current { location, .. } => {
                assert_eq!(location.lat, Some(-33.87));
                assert_eq!(location.lon, Some(151.21));
                assert!(matches!(
                    location.query().unwrap(),
                    WeatherQuery::Coordinates { .. }
                ));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn place_and_coordinates_conflict() {
        let res = Cli::try_parse_from([
            "skycast", "forecast", "--place", "Oslo", "--lat", "1", "--lon", "2",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn name_becomes_display_hint() {
        let cli = Cli::try_parse_from([
            "skycast", "show", "--lat", "1", "--lon", "2", "--name", "Cabin",
        ])
        .unwrap();

        let Command::Show { location, .. } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(
            location.query().unwrap(),
            WeatherQuery::Coordinates {
                lat: 1.0,
                lon: 2.0,
                display_name_hint: Some("Cabin".into()),
            }
        );
    }

    #[test]
    fn missing_location_is_invalid_input() {
        let cli = Cli::try_parse_from(["skycast", "current"]).unwrap();
        let Command::Current { location, .. } = cli.command else {
            panic!("expected current");
        };
        assert!(matches!(location.query(), Err(WeatherError::InvalidInput(_))));
    }
}
