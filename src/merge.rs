//! Joins vehicle and delay records on trip id.

use std::collections::HashMap;

use tracing::debug;

use crate::records::{DelayRecord, RecordTable, UnifiedRecord, VehicleRecord};

/// Inner join on `trip_id`, in vehicle order.
///
/// Keys are compared exactly. A trip id repeated on either side yields every
/// pairing; trips present in only one feed are dropped. Blank trip ids never
/// match, not even each other.
pub fn merge(vehicles: &[VehicleRecord], delays: &[DelayRecord]) -> RecordTable {
    let mut by_trip: HashMap<&str, Vec<&DelayRecord>> = HashMap::with_capacity(delays.len());
    for delay in delays.iter().filter(|d| !d.trip_id.is_empty()) {
        by_trip.entry(delay.trip_id.as_str()).or_default().push(delay);
    }

    let mut rows = Vec::with_capacity(vehicles.len().min(delays.len()));
    for vehicle in vehicles {
        if let Some(matches) = by_trip.get(vehicle.trip_id.as_str()) {
            rows.extend(matches.iter().map(|d| UnifiedRecord::joined(vehicle, d)));
        }
    }

    debug!(
        vehicles = vehicles.len(),
        delays = delays.len(),
        joined = rows.len(),
        "Feeds merged"
    );
    RecordTable::from(rows)
}

/// Table for a pipeline running without a trip-update feed: every vehicle,
/// no delay columns.
pub fn vehicles_only(vehicles: &[VehicleRecord]) -> RecordTable {
    vehicles
        .iter()
        .map(UnifiedRecord::vehicle_only)
        .collect::<Vec<_>>()
        .into()
}
