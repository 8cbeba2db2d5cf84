//! Output formatting and persistence for the station dataset.
//!
//! Supports pretty-printing, JSON logging, and writing the dataset file.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::station::Station;
use crate::stats::CrowdSummary;

/// Logs the run summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &CrowdSummary) {
    debug!("{:#?}", summary);
}

/// Logs the dataset as pretty-printed JSON.
pub fn print_json(stations: &[Station]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(stations)?);
    Ok(())
}

/// Renders `value` as JSON indented by four spaces.
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Writes the station dataset to `path`, creating parent directories.
///
/// Overwrites any existing file.
pub fn write_dataset(path: &str, stations: &[Station]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }

    debug!(path, stations = stations.len(), "Writing dataset");
    let bytes = to_json_bytes(stations)?;
    fs::write(path, bytes).with_context(|| format!("failed to write '{path}'"))?;

    Ok(())
}
