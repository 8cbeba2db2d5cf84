//! Decoders for the station and ridership tables.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

use crate::fetch::{HttpClient, read_source};
use crate::station::StationRecord;

/// One dated ridership row: column key to raw cell text.
pub type RidershipRecord = HashMap<String, String>;

/// Table encoding of a ridership source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidershipFormat {
    Csv,
    Json,
}

impl RidershipFormat {
    /// Picks the format from the source name; `.json` and `.json.gz` are JSON,
    /// everything else is CSV.
    pub fn from_source(source: &str) -> Self {
        let name = source.strip_suffix(".gz").unwrap_or(source);
        if name.to_ascii_lowercase().ends_with(".json") {
            RidershipFormat::Json
        } else {
            RidershipFormat::Csv
        }
    }
}

/// Decodes a CSV stops table.
///
/// # Errors
///
/// Returns an error if a required column is missing or a coordinate is not a number.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<StationRecord>> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let mut stations = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        let record: StationRecord =
            result.with_context(|| format!("invalid station row {}", i + 1))?;
        stations.push(record);
    }

    Ok(stations)
}

/// Decodes a ridership table, keeping every cell as text.
pub fn parse_ridership(bytes: &[u8], format: RidershipFormat) -> Result<Vec<RidershipRecord>> {
    match format {
        RidershipFormat::Csv => {
            let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
            let mut rows = Vec::new();
            for (i, result) in rdr.deserialize().enumerate() {
                let row: RidershipRecord =
                    result.with_context(|| format!("invalid ridership row {}", i + 1))?;
                rows.push(row);
            }
            Ok(rows)
        }
        RidershipFormat::Json => {
            let raw: Vec<HashMap<String, Value>> =
                serde_json::from_slice(bytes).context("ridership JSON must be an array of objects")?;
            Ok(raw
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(key, value)| (key, cell_text(value)))
                        .collect()
                })
                .collect())
        }
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reads and decodes the station table at `source`.
#[tracing::instrument(skip(client))]
pub fn load_stations<C: HttpClient>(client: &C, source: &str) -> Result<Vec<StationRecord>> {
    let result = read_source(client, source).and_then(|bytes| parse_stations(&bytes));
    let records = result.with_context(|| format!("failed to load station source '{source}'"))?;
    info!(stations = records.len(), "Station source loaded");
    Ok(records)
}

/// Reads the ridership table at `source` and keeps its most recent snapshot.
#[tracing::instrument(skip(client))]
pub fn load_snapshot<C: HttpClient>(client: &C, source: &str) -> Result<RidershipSnapshot> {
    let format = RidershipFormat::from_source(source);
    let result = read_source(client, source)
        .and_then(|bytes| parse_ridership(&bytes, format))
        .and_then(RidershipSnapshot::most_recent);
    let snapshot = result.with_context(|| format!("failed to load ridership source '{source}'"))?;
    info!(date = snapshot.date().unwrap_or("unknown"), "Ridership snapshot loaded");
    Ok(snapshot)
}

/// The ridership row the estimate is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct RidershipSnapshot {
    values: RidershipRecord,
}

impl RidershipSnapshot {
    /// Selects the most recent snapshot. Rows are ordered chronologically, so
    /// this is the last one.
    ///
    /// # Errors
    ///
    /// Returns an error when the table has no rows.
    pub fn most_recent(records: Vec<RidershipRecord>) -> Result<Self> {
        records
            .into_iter()
            .next_back()
            .map(|values| Self { values })
            .ok_or_else(|| anyhow!("ridership table has no rows"))
    }

    /// The snapshot's `date` column, if the source has one.
    pub fn date(&self) -> Option<&str> {
        self.values.get("date").map(String::as_str)
    }

    /// Raw cell text for `column`; absent columns read as blank.
    pub fn raw(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn daily_count(&self, column: &str) -> DailyCount {
        parse_daily_count(self.raw(column))
    }
}

impl From<RidershipRecord> for RidershipSnapshot {
    fn from(values: RidershipRecord) -> Self {
        Self { values }
    }
}

/// Outcome of reading one daily ridership cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyCount {
    Parsed(u64),
    Blank,
    /// Not a usable count; contributes zero load.
    Malformed,
}

impl DailyCount {
    pub fn value(self) -> u64 {
        match self {
            DailyCount::Parsed(n) => n,
            DailyCount::Blank | DailyCount::Malformed => 0,
        }
    }
}

/// Parses a daily count, truncating decimals toward zero.
pub fn parse_daily_count(raw: &str) -> DailyCount {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DailyCount::Blank;
    }

    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => DailyCount::Parsed(v.trunc() as u64),
        _ => DailyCount::Malformed,
    }
}
