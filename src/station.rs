use serde::{Deserialize, Deserializer, Serialize};

/// One row of the GTFS-style stops table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationRecord {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(deserialize_with = "trimmed_f64")]
    pub stop_lat: f64,
    #[serde(deserialize_with = "trimmed_f64")]
    pub stop_lon: f64,
    #[serde(default)]
    pub route_id: String,
}

/// Coordinates tolerate surrounding whitespace; names and ids stay verbatim.
fn trimmed_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.trim().parse().map_err(serde::de::Error::custom)
}

/// A station with its computed crowd level, as written to the output dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub route_id: String,
    /// Crowd fraction in [0, 1], three decimals.
    pub crowd: f64,
}

impl Station {
    pub fn from_record(record: &StationRecord, crowd: f64) -> Self {
        Station {
            id: record.stop_id.clone(),
            name: record.stop_name.clone(),
            lat: record.stop_lat,
            lng: record.stop_lon,
            route_id: record.route_id.clone(),
            crowd,
        }
    }
}
