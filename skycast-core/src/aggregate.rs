//! Reduction of 3-hourly provider samples into daily summaries.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::condition::CanonicalCondition;
use crate::model::{DailyAggregate, RawSample};

/// The provider never returns more than this many days.
pub const MAX_PROVIDER_DAYS: usize = 5;

/// Round half up (`-2.5` becomes `-2`).
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub(crate) fn clamp_pct(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

pub(crate) fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

#[derive(Debug, Clone, Copy)]
pub struct DailyAggregator {
    offset: FixedOffset,
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self { offset: Utc.fix() }
    }
}

struct DayGroup<'a> {
    date: NaiveDate,
    samples: Vec<&'a RawSample>,
}

impl DailyAggregator {
    /// Aggregator that assigns samples to calendar dates in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Aggregator for a provider-reported UTC offset in seconds. Invalid
    /// offsets fall back to UTC.
    pub fn with_offset_secs(secs: i32) -> Self {
        match FixedOffset::east_opt(secs) {
            Some(offset) => Self::new(offset),
            None => {
                tracing::warn!(secs, "invalid provider UTC offset, grouping by UTC date");
                Self::default()
            }
        }
    }

    /// Group `samples` by calendar date and reduce each group.
    ///
    /// Groups keep first-seen order, and only the first
    /// [`MAX_PROVIDER_DAYS`] groups are returned.
    pub fn aggregate(&self, samples: &[RawSample]) -> Vec<DailyAggregate> {
        let mut groups: Vec<DayGroup<'_>> = Vec::new();

        for sample in samples {
            let date = sample.timestamp.with_timezone(&self.offset).date_naive();
            match groups.iter_mut().find(|g| g.date == date) {
                Some(group) => group.samples.push(sample),
                None => groups.push(DayGroup {
                    date,
                    samples: vec![sample],
                }),
            }
        }

        groups
            .into_iter()
            .take(MAX_PROVIDER_DAYS)
            .filter_map(reduce_group)
            .collect()
    }
}

fn reduce_group(group: DayGroup<'_>) -> Option<DailyAggregate> {
    let first = group.samples.first()?;
    let count = group.samples.len() as f64;

    let high = group
        .samples
        .iter()
        .map(|s| s.temperature_c)
        .fold(f64::NEG_INFINITY, f64::max);
    let low = group
        .samples
        .iter()
        .map(|s| s.temperature_c)
        .fold(f64::INFINITY, f64::min);

    let wind_kmh = group.samples.iter().map(|s| s.wind_speed_ms * 3.6).sum::<f64>() / count;
    let humidity = group.samples.iter().map(|s| s.humidity_pct).sum::<f64>() / count;
    let precip_mm: f64 = group.samples.iter().filter_map(|s| s.precipitation_mm).sum();

    Some(DailyAggregate {
        date: group.date,
        day: weekday_label(group.date),
        high_c: round_half_up(high) as i32,
        low_c: round_half_up(low) as i32,
        // first sample of the day decides, no majority vote
        condition: CanonicalCondition::classify(&first.condition_main, &first.condition_description),
        precipitation_pct: clamp_pct(round_half_up(precip_mm * 10.0)),
        wind_speed_kmh: round_half_up(wind_kmh).max(0) as u32,
        humidity_pct: clamp_pct(round_half_up(humidity)),
    })
}
