//! Common utility functions shared across CLI commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use keepreal_core::{Config, GalleryCache, LocationData, Minter, RealityPolicy, RpcLedger};
use solana_sdk::signature::{read_keypair_file, Keypair};

/// Assemble a pipeline from the environment configuration.
pub fn build_minter(config: &Config) -> Result<Minter> {
    let store = keepreal_core::ipfs::from_config(config)
        .context("Failed to select a content store (set KEEPREAL_PINATA_JWT or KEEPREAL_ALLOW_MOCK_STORE=true)")?;

    Ok(Minter::new(
        RealityPolicy::default(),
        store,
        Arc::new(RpcLedger::new(config.rpc_url.clone())),
        GalleryCache::new(config.data_dir.clone()),
    ))
}

/// Load a JSON keypair file in the standard Solana CLI format.
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    read_keypair_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to read keypair file {}: {e}", path.display()))
}

/// Parse "LAT,LON" into capture coordinates.
pub fn parse_location(value: &str) -> Result<LocationData> {
    let Some((lat, lon)) = value.split_once(',') else {
        bail!("Location must be LAT,LON, got: {value}");
    };

    let latitude: f64 = lat.trim().parse().context("Invalid latitude")?;
    let longitude: f64 = lon.trim().parse().context("Invalid longitude")?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        bail!("Coordinates out of range: {latitude},{longitude}");
    }

    Ok(LocationData {
        latitude: Some(latitude),
        longitude: Some(longitude),
        label: None,
    })
}

/// Parse an RFC 3339 capture time.
pub fn parse_captured_at(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid RFC 3339 timestamp: {value}"))
}

/// Format a Unix timestamp (milliseconds) as a human-readable UTC string.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        _ => format!("{timestamp_ms}ms"),
    }
}
