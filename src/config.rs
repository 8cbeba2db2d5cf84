//! Static tables driving the crowd estimate.
//!
//! [`CrowdConfig::default`] carries the built-in tables for the Klang Valley
//! rail network. A JSON file can override any subset of them:
//! ```json
//! {
//!   "active_hours": 18,
//!   "peak_hours": [{ "start": 7, "end": 9 }],
//!   "lines": { "line_capacity": { "rail_lrt_ampang": 5500 } }
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line id (GTFS `route_id`) to ridership column.
static ROUTE_TO_COLUMN: &[(&str, &str)] = &[
    ("AG", "rail_lrt_ampang"),
    ("PH", "rail_lrt_ampang"),
    ("KJ", "rail_lrt_kj"),
    ("MR", "rail_monorail"),
    ("MRT", "rail_mrt_kajang"),
    ("PYL", "rail_mrt_pjy"),
];

/// Assumed hourly passenger capacity per ridership column.
static LINE_CAPACITY: &[(&str, u32)] = &[
    ("rail_lrt_ampang", 5000),
    ("rail_mrt_kajang", 8000),
    ("rail_lrt_kj", 4000),
    ("rail_monorail", 3000),
    ("rail_mrt_pjy", 6000),
    ("rail_ets", 2000),
    ("rail_intercity", 1500),
    ("rail_komuter_utara", 2500),
    ("rail_tebrau", 2500),
    ("rail_komuter", 2500),
];

/// Inclusive hour-of-day interval during which load is boosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakRange {
    pub start: u8,
    pub end: u8,
}

impl PeakRange {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u8) -> bool {
        self.start <= hour && hour <= self.end
    }
}

/// Maps line ids to ridership columns, and ridership columns to capacities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineRegistry {
    pub route_to_column: BTreeMap<String, String>,
    pub line_capacity: BTreeMap<String, u32>,
}

impl Default for LineRegistry {
    fn default() -> Self {
        Self {
            route_to_column: ROUTE_TO_COLUMN
                .iter()
                .map(|(route, column)| (route.to_string(), column.to_string()))
                .collect(),
            line_capacity: LINE_CAPACITY
                .iter()
                .map(|(column, capacity)| (column.to_string(), *capacity))
                .collect(),
        }
    }
}

impl LineRegistry {
    /// Returns the ridership column for `line_id`, if the line is mapped.
    pub fn column_for(&self, line_id: &str) -> Option<&str> {
        self.route_to_column.get(line_id).map(String::as_str)
    }

    /// Returns the capacity of `column`, or `fallback` when the column is
    /// absent or has no capacity entry.
    pub fn capacity_for(&self, column: Option<&str>, fallback: u32) -> u32 {
        column
            .and_then(|c| self.line_capacity.get(c))
            .copied()
            .unwrap_or(fallback)
    }
}

/// Every constant the estimator needs, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrowdConfig {
    /// Hours per day that daily ridership is spread over.
    pub active_hours: f64,
    pub peak_hours: Vec<PeakRange>,
    pub peak_multiplier: f64,
    /// Scales capacity so the visual crowd level stays below 1.0.
    pub visual_capacity_factor: f64,
    /// Capacity used for columns missing from the registry.
    pub default_capacity: u32,
    pub lines: LineRegistry,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            active_hours: 16.0,
            peak_hours: vec![PeakRange::new(8, 10), PeakRange::new(17, 19)],
            peak_multiplier: 1.5,
            visual_capacity_factor: 5.0,
            default_capacity: 500,
            lines: LineRegistry::default(),
        }
    }
}

impl CrowdConfig {
    /// Loads overrides from a JSON file at `path`. Omitted fields keep their
    /// built-in values.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects tables that would make the estimate divide by zero or never match.
    pub fn validate(&self) -> Result<()> {
        if !(self.active_hours > 0.0) {
            bail!("active_hours must be positive, got {}", self.active_hours);
        }
        if !(self.visual_capacity_factor > 0.0) {
            bail!(
                "visual_capacity_factor must be positive, got {}",
                self.visual_capacity_factor
            );
        }
        if !(self.peak_multiplier >= 0.0) {
            bail!(
                "peak_multiplier must not be negative, got {}",
                self.peak_multiplier
            );
        }
        for range in &self.peak_hours {
            if range.start > range.end || range.end > 23 {
                bail!("invalid peak range {}-{}", range.start, range.end);
            }
        }
        if self.default_capacity == 0 {
            bail!("default_capacity must be positive");
        }
        if let Some((column, _)) = self.lines.line_capacity.iter().find(|(_, c)| **c == 0) {
            bail!("capacity for '{column}' must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_default_config_is_valid() {
        CrowdConfig::default().validate().unwrap();
    }

    #[test]
    fn test_peak_range_is_inclusive() {
        let range = PeakRange::new(8, 10);
        assert!(!range.contains(7));
        assert!(range.contains(8));
        assert!(range.contains(10));
        assert!(!range.contains(11));
    }

    #[test]
    fn test_registry_lookups() {
        let lines = LineRegistry::default();
        assert_eq!(lines.column_for("PH"), Some("rail_lrt_ampang"));
        assert_eq!(lines.column_for("BRT"), None);
        assert_eq!(lines.capacity_for(Some("rail_mrt_kajang"), 500), 8000);
        assert_eq!(lines.capacity_for(Some("rail_unknown"), 500), 500);
        assert_eq!(lines.capacity_for(None, 500), 500);
    }

    #[test]
    fn test_load_partial_override_keeps_defaults() {
        let path = temp_path("station_crowd_test_config.json");
        fs::write(
            &path,
            r#"{ "active_hours": 18, "lines": { "line_capacity": { "rail_x": 100 } } }"#,
        )
        .unwrap();

        let config = CrowdConfig::load(&path).unwrap();
        assert_eq!(config.active_hours, 18.0);
        assert_eq!(config.peak_hours, CrowdConfig::default().peak_hours);
        assert_eq!(config.lines.capacity_for(Some("rail_x"), 1), 100);
        // route_to_column was not given, so the built-in map survives
        assert_eq!(config.lines.column_for("KJ"), Some("rail_lrt_kj"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_invalid_tables() {
        let path = temp_path("station_crowd_test_bad_config.json");
        fs::write(&path, r#"{ "peak_hours": [{ "start": 20, "end": 18 }] }"#).unwrap();

        assert!(CrowdConfig::load(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_divisors() {
        let mut config = CrowdConfig::default();
        config.active_hours = 0.0;
        assert!(config.validate().is_err());

        let mut config = CrowdConfig::default();
        config.visual_capacity_factor = 0.0;
        assert!(config.validate().is_err());

        let mut config = CrowdConfig::default();
        config.lines.line_capacity.insert("rail_zero".into(), 0);
        assert!(config.validate().is_err());
    }
}
