//! Reads raw source bytes from a local path or an HTTP(S) URL.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

/// Returns true when `source` should be fetched over HTTP.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads `source` through `client` or from disk, gunzipping `.gz` sources.
pub fn read_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        client.get_bytes(source)?
    } else {
        std::fs::read(source).with_context(|| format!("cannot read '{source}'"))?
    };
    debug!(source, bytes = bytes.len(), "Source bytes loaded");

    if source.ends_with(".gz") {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut decoded)
            .with_context(|| format!("'{source}' is not valid gzip"))?;
        Ok(decoded)
    } else {
        Ok(bytes)
    }
}
