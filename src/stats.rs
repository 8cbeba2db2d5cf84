use serde::Serialize;

use crate::station::Station;

/// Run-level summary of one crowd estimate.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CrowdSummary {
    pub hour: u8,
    pub is_peak: bool,
    pub snapshot_date: Option<String>,
    pub stations: usize,
    pub lines: usize,

    // recovered data issues
    pub unmapped_stations: usize,
    pub skipped_values: usize,

    pub mean_crowd: f64,
    pub max_crowd: f64,
    pub saturated_stations: usize,
}

impl CrowdSummary {
    /// Fills the crowd distribution fields from the computed stations.
    pub fn with_crowds(mut self, stations: &[Station]) -> Self {
        let crowds: Vec<f64> = stations.iter().map(|s| s.crowd).collect();
        self.stations = stations.len();
        self.mean_crowd = mean(&crowds);
        self.max_crowd = crowds.iter().copied().fold(0.0, f64::max);
        self.saturated_stations = crowds.iter().filter(|c| **c >= 1.0).count();
        self
    }
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
