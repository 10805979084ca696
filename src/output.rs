//! Output formatting and persistence for snapshots and fleet summaries.
//!
//! Supports pretty-printing, JSON snapshot files for the map display, and
//! CSV append of summary rows.

use anyhow::Result;
use tracing::{debug, info};

use crate::pipeline::Snapshot;
use crate::summary::FleetSummary;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &FleetSummary) {
    debug!("{:#?}", summary);
}

/// Logs a summary as pretty-printed JSON.
pub fn print_json(summary: &FleetSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Writes the snapshot as JSON, replacing the file.
///
/// The file is written next to its final name first and renamed, so a reader
/// polling it never sees a partial table.
pub fn write_snapshot(path: &str, snapshot: &Snapshot) -> Result<()> {
    let tmp = format!("{path}.tmp");
    std::fs::write(&tmp, serde_json::to_vec(snapshot)?)?;
    std::fs::rename(&tmp, path)?;
    debug!(path, rows = snapshot.records.len(), "Snapshot written");
    Ok(())
}

/// Appends a [`FleetSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, summary: &FleetSummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
