//! Per-station crowd estimate from daily line ridership.
//!
//! Daily ridership of a line is spread evenly over its stations and over the
//! configured active hours, boosted during peak hours, then normalized
//! against the line's scaled hourly capacity.

use anyhow::{Result, bail};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::config::CrowdConfig;
use crate::sources::{DailyCount, RidershipSnapshot};
use crate::station::{Station, StationRecord};
use crate::stats::CrowdSummary;

/// Number of stations sharing each line id, the empty id included.
pub fn line_station_counts(records: &[StationRecord]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(record.route_id.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Passengers per station per active hour.
pub fn hourly_load(daily: u64, active_hours: f64, station_count: usize) -> f64 {
    (daily as f64 / active_hours) / station_count.max(1) as f64
}

/// Multiplier for `hour`: the first peak range containing it wins.
pub fn peak_factor(hour: u8, config: &CrowdConfig) -> f64 {
    config
        .peak_hours
        .iter()
        .find(|range| range.contains(hour))
        .map_or(1.0, |_| config.peak_multiplier)
}

/// Load relative to scaled capacity, clamped to [0, 1] and rounded to three
/// decimals, ties to even. A non-finite ratio reads as zero.
pub fn crowd_fraction(hourly: f64, capacity: u32, scaling: f64) -> f64 {
    let ratio = hourly / (capacity as f64 * scaling);
    if !ratio.is_finite() {
        return 0.0;
    }
    (ratio.clamp(0.0, 1.0) * 1000.0).round_ties_even() / 1000.0
}

/// Result of one estimate run.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub stations: Vec<Station>,
    pub summary: CrowdSummary,
}

/// Computes crowd levels for a fixed configuration and hour of day.
pub struct CrowdEstimator<'a> {
    config: &'a CrowdConfig,
    hour: u8,
}

impl<'a> CrowdEstimator<'a> {
    /// # Errors
    ///
    /// Returns an error if `hour` is not in 0..=23 or `config` fails validation.
    pub fn new(config: &'a CrowdConfig, hour: u8) -> Result<Self> {
        config.validate()?;
        if hour > 23 {
            bail!("hour must be between 0 and 23, got {hour}");
        }
        Ok(Self { config, hour })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn is_peak(&self) -> bool {
        self.config.peak_hours.iter().any(|r| r.contains(self.hour))
    }

    /// Hourly load of one station before normalization.
    pub fn station_load(&self, daily: u64, station_count: usize) -> f64 {
        hourly_load(daily, self.config.active_hours, station_count)
            * peak_factor(self.hour, self.config)
    }

    /// Crowd level of every station in `records`, in input order.
    pub fn estimate(&self, records: &[StationRecord], snapshot: &RidershipSnapshot) -> Estimate {
        let lines = &self.config.lines;
        let counts = line_station_counts(records);

        let mut daily_by_column: HashMap<&str, DailyCount> = HashMap::new();
        let mut unmapped = BTreeSet::new();
        let mut unmapped_stations = 0;

        let stations = records
            .iter()
            .map(|record| {
                let column = lines.column_for(&record.route_id);
                let daily = match column {
                    Some(column) => *daily_by_column
                        .entry(column)
                        .or_insert_with(|| snapshot.daily_count(column)),
                    None => {
                        unmapped_stations += 1;
                        unmapped.insert(record.route_id.as_str());
                        DailyCount::Blank
                    }
                };

                let station_count = counts.get(record.route_id.as_str()).copied().unwrap_or(1);
                let load = self.station_load(daily.value(), station_count);
                let capacity = lines.capacity_for(column, self.config.default_capacity);
                let crowd = crowd_fraction(load, capacity, self.config.visual_capacity_factor);

                debug!(
                    stop_id = %record.stop_id,
                    route_id = %record.route_id,
                    daily = daily.value(),
                    station_count,
                    load,
                    capacity,
                    crowd,
                    "Station estimated"
                );

                Station::from_record(record, crowd)
            })
            .collect::<Vec<_>>();

        let mut skipped_values = 0;
        for (column, daily) in &daily_by_column {
            if *daily == DailyCount::Malformed {
                skipped_values += 1;
                debug!(
                    column,
                    raw = snapshot.raw(column),
                    "Unparseable ridership value treated as zero"
                );
            }
        }

        if !unmapped.is_empty() {
            debug!(?unmapped, unmapped_stations, "Stations on unmapped lines get zero load");
        }

        let summary = CrowdSummary {
            hour: self.hour,
            is_peak: self.is_peak(),
            snapshot_date: snapshot.date().map(str::to_string),
            lines: counts.len(),
            unmapped_stations,
            skipped_values,
            ..Default::default()
        }
        .with_crowds(&stations);

        Estimate { stations, summary }
    }
}
