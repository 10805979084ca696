//! Record types produced by the pipeline and the rules that classify them.
//!
//! Field names on the wire follow the columns the map display binds to
//! (`vehicleID`, `tripID`, `delayClass`, ...).

use std::fmt;

use serde::Serialize;

// Vehicle status colors
pub const IN_TRANSIT_COLOR: &str = "#0077BB";
pub const STOPPED_COLOR: &str = "#EE7733";

// Delay class colors
pub const ON_TIME_COLOR: &str = "#009988";
pub const LATE_COLOR: &str = "#CC3311";

/// GTFS-RT `VehicleStopStatus::STOPPED_AT`.
pub const STATUS_STOPPED_AT: i32 = 1;
/// GTFS-RT `VehicleStopStatus::IN_TRANSIT_TO`, also the value of an unset status.
pub const STATUS_IN_TRANSIT_TO: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusClass {
    Stopped,
    #[serde(rename = "In Transit")]
    InTransit,
}

impl StatusClass {
    /// `1` is stopped; every other code, including `0` (incoming at), is in transit.
    pub fn from_code(current_status: i32) -> Self {
        if current_status == STATUS_STOPPED_AT {
            StatusClass::Stopped
        } else {
            StatusClass::InTransit
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            StatusClass::Stopped => STOPPED_COLOR,
            StatusClass::InTransit => IN_TRANSIT_COLOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Stopped => "Stopped",
            StatusClass::InTransit => "In Transit",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DelayClass {
    #[serde(rename = "On time")]
    OnTime,
    Late,
}

impl DelayClass {
    /// Anything at or ahead of schedule counts as on time.
    pub fn from_minutes(delay: f64) -> Self {
        if delay <= 0.0 {
            DelayClass::OnTime
        } else {
            DelayClass::Late
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DelayClass::OnTime => ON_TIME_COLOR,
            DelayClass::Late => LATE_COLOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DelayClass::OnTime => "On time",
            DelayClass::Late => "Late",
        }
    }
}

impl fmt::Display for DelayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a vehicle at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "vehicleID")]
    pub vehicle_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "tripID")]
    pub trip_id: String,
    pub start_time: String,
    pub last_update: String,
    pub current_status: i32,
    pub current_status_class: StatusClass,
    pub status_color: &'static str,
}

/// Delay of a trip at its next stop, in minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayRecord {
    #[serde(rename = "tripID")]
    pub trip_id: String,
    pub delay: f64,
    pub delay_class: DelayClass,
    pub delay_color: &'static str,
}

impl DelayRecord {
    pub fn from_seconds(trip_id: impl Into<String>, delay_seconds: i32) -> Self {
        let delay = f64::from(delay_seconds) / 60.0;
        let delay_class = DelayClass::from_minutes(delay);
        Self {
            trip_id: trip_id.into(),
            delay,
            delay_class,
            delay_color: delay_class.color(),
        }
    }
}

/// A vehicle joined with the delay of the trip it serves.
///
/// The delay columns are `None` only when the pipeline runs without a
/// trip-update feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedRecord {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "vehicleID")]
    pub vehicle_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "tripID")]
    pub trip_id: String,
    pub start_time: String,
    pub last_update: String,
    pub current_status: i32,
    pub current_status_class: StatusClass,
    pub status_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_class: Option<DelayClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_color: Option<&'static str>,
}

impl UnifiedRecord {
    pub fn joined(vehicle: &VehicleRecord, delay: &DelayRecord) -> Self {
        Self {
            delay: Some(delay.delay),
            delay_class: Some(delay.delay_class),
            delay_color: Some(delay.delay_color),
            ..Self::vehicle_only(vehicle)
        }
    }

    pub fn vehicle_only(vehicle: &VehicleRecord) -> Self {
        Self {
            x: vehicle.x,
            y: vehicle.y,
            vehicle_id: vehicle.vehicle_id.clone(),
            label: vehicle.label.clone(),
            trip_id: vehicle.trip_id.clone(),
            start_time: vehicle.start_time.clone(),
            last_update: vehicle.last_update.clone(),
            current_status: vehicle.current_status,
            current_status_class: vehicle.current_status_class,
            status_color: vehicle.status_color,
            delay: None,
            delay_class: None,
            delay_color: None,
        }
    }
}

/// The rows handed to the display on one tick.
///
/// An empty table is a normal result meaning "no data this tick".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordTable {
    rows: Vec<UnifiedRecord>,
}

impl RecordTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[UnifiedRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedRecord> {
        self.rows.iter()
    }
}

impl From<Vec<UnifiedRecord>> for RecordTable {
    fn from(rows: Vec<UnifiedRecord>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a UnifiedRecord;
    type IntoIter = std::slice::Iter<'a, UnifiedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
