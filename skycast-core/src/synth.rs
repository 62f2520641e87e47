//! Extension of a short provider forecast to a fixed number of days.
//!
//! Continuation days are perturbations of the last real day. Every
//! generated day is built from that same anchor, so the extrapolation
//! cannot drift. The high > low and 0..=100 invariants are enforced after
//! the random draw, whatever the draw was.

use chrono::Duration;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use crate::aggregate::{clamp_pct, round_half_up, weekday_label};
use crate::error::WeatherError;
use crate::model::{DailyAggregate, ForecastDay};

/// Number of days the product promises.
pub const DEFAULT_FORECAST_DAYS: usize = 7;

const TEMPERATURE_SPREAD_C: f64 = 3.0;
const PRECIPITATION_SPREAD: f64 = 10.0;
const WIND_SPREAD_KMH: f64 = 5.0;
const HUMIDITY_SPREAD: f64 = 10.0;

/// Source of uniformly distributed noise.
pub trait RandomSource {
    /// A value drawn uniformly from `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// [`RandomSource`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl RngSource<ThreadRng> {
    pub fn thread() -> Self {
        Self { rng: rand::rng() }
    }
}

impl RngSource<StdRng> {
    /// Reproducible source, same seed gives the same continuation days.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.random_range(low..high)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForecastSynthesizer {
    target_len: usize,
}

impl Default for ForecastSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST_DAYS)
    }
}

impl ForecastSynthesizer {
    pub fn new(target_len: usize) -> Self {
        Self { target_len }
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Pad `days` to exactly `target_len` entries.
    ///
    /// Input days are copied unchanged with `synthetic = false`. If there
    /// are already enough, the surplus is dropped. An empty input cannot be
    /// extended and is rejected.
    pub fn extend<R>(
        &self,
        days: &[DailyAggregate],
        rng: &mut R,
    ) -> Result<Vec<ForecastDay>, WeatherError>
    where
        R: RandomSource + ?Sized,
    {
        let mut out: Vec<ForecastDay> = days
            .iter()
            .take(self.target_len)
            .cloned()
            .map(|day| ForecastDay {
                day,
                synthetic: false,
            })
            .collect();

        if out.len() == self.target_len {
            return Ok(out);
        }

        let last = days.last().ok_or_else(|| {
            WeatherError::InvalidInput("cannot extend a forecast with no days".into())
        })?;

        let missing = self.target_len - days.len();
        tracing::debug!(
            real = days.len(),
            missing,
            from = %last.date,
            "synthesizing continuation days"
        );

        for offset in 1..=missing {
            out.push(ForecastDay {
                day: continue_from(last, offset as i64, rng),
                synthetic: true,
            });
        }

        Ok(out)
    }
}

fn continue_from<R>(last: &DailyAggregate, offset: i64, rng: &mut R) -> DailyAggregate
where
    R: RandomSource + ?Sized,
{
    let date = last.date + Duration::days(offset);

    let variation = rng.uniform(-TEMPERATURE_SPREAD_C, TEMPERATURE_SPREAD_C);
    let candidate_high = round_half_up(f64::from(last.high_c) + variation);
    let candidate_low = round_half_up(f64::from(last.low_c) + variation);

    let precipitation = round_half_up(
        f64::from(last.precipitation_pct)
            + rng.uniform(-PRECIPITATION_SPREAD, PRECIPITATION_SPREAD),
    );
    let wind = round_half_up(
        f64::from(last.wind_speed_kmh) + rng.uniform(-WIND_SPREAD_KMH, WIND_SPREAD_KMH),
    );
    let humidity = round_half_up(
        f64::from(last.humidity_pct) + rng.uniform(-HUMIDITY_SPREAD, HUMIDITY_SPREAD),
    );

    DailyAggregate {
        date,
        day: weekday_label(date),
        high_c: candidate_high.max(candidate_low + 1) as i32,
        low_c: candidate_high.min(candidate_low) as i32,
        condition: last.condition,
        precipitation_pct: clamp_pct(precipitation),
        wind_speed_kmh: wind.max(0) as u32,
        humidity_pct: clamp_pct(humidity),
    }
}
