//! Turns decoded feed entities into [`VehicleRecord`]s and [`DelayRecord`]s.

use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::clock::timestamp_to_hms;
use crate::error::FeedError;
use crate::gtfs_rt::{FeedEntity, TripUpdate};
use crate::projection::Projector;
use crate::records::{DelayRecord, STATUS_IN_TRANSIT_TO, StatusClass, VehicleRecord};

/// Per-feed record extraction, configured once and reused every tick.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    projector: Projector,
    timezone: Tz,
    include_label: bool,
}

impl Extractor {
    pub fn new(projector: Projector, timezone: Tz, include_label: bool) -> Self {
        Self {
            projector,
            timezone,
            include_label,
        }
    }

    /// Builds one record per entity that carries a positioned vehicle.
    ///
    /// Entities without a vehicle payload or without a position are skipped.
    /// A vehicle with no position is left out rather than drawn at (0, 0).
    pub fn extract_vehicles(&self, entities: &[FeedEntity]) -> Vec<VehicleRecord> {
        let mut records = Vec::with_capacity(entities.len());
        let mut skipped = 0usize;

        for entity in entities {
            match self.vehicle_record(entity) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "Entities without a positioned vehicle skipped");
        }
        records
    }

    fn vehicle_record(&self, entity: &FeedEntity) -> Option<VehicleRecord> {
        let vehicle = entity.vehicle.as_ref()?;
        let position = vehicle.position.as_ref()?;

        let point = self
            .projector
            .project(f64::from(position.longitude), f64::from(position.latitude));

        let descriptor = vehicle.vehicle.as_ref();
        let vehicle_id = descriptor
            .and_then(|d| d.id.clone())
            .unwrap_or_default();
        let label = self.include_label.then(|| {
            descriptor
                .and_then(|d| d.label.as_deref())
                .unwrap_or_default()
                .trim()
                .to_string()
        });

        let trip = vehicle.trip.as_ref();
        let trip_id = trip
            .and_then(|t| t.trip_id.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string();
        let start_time = trip.and_then(|t| t.start_time.clone()).unwrap_or_default();

        let current_status = vehicle.current_status.unwrap_or(STATUS_IN_TRANSIT_TO);
        let current_status_class = StatusClass::from_code(current_status);

        Some(VehicleRecord {
            x: point.x,
            y: point.y,
            vehicle_id,
            label,
            trip_id,
            start_time,
            last_update: timestamp_to_hms(vehicle.timestamp.unwrap_or(0), self.timezone),
            current_status,
            current_status_class,
            status_color: current_status_class.color(),
        })
    }

    /// Builds one delay record per trip update, from its first stop time update.
    ///
    /// A trip update with no stop time updates is logged and dropped; the
    /// rest of the feed is still extracted.
    pub fn extract_delays(&self, entities: &[FeedEntity]) -> Vec<DelayRecord> {
        let mut records = Vec::with_capacity(entities.len());

        for entity in entities {
            let Some(update) = entity.trip_update.as_ref() else {
                continue;
            };
            match delay_record(&entity.id, update) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "Skipping trip update"),
            }
        }

        records
    }
}

fn delay_record(entity_id: &str, update: &TripUpdate) -> Result<DelayRecord, FeedError> {
    let trip_id = update
        .trip
        .trip_id
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_string();

    let Some(first) = update.stop_time_update.first() else {
        return Err(FeedError::MissingStopTimeUpdate {
            entity_id: entity_id.to_string(),
            trip_id,
        });
    };

    let delay_seconds = first.arrival.as_ref().and_then(|a| a.delay).unwrap_or(0);

    Ok(DelayRecord::from_seconds(trip_id, delay_seconds))
}
