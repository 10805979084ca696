//! Dashboard indicator counts computed from a record table.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::Snapshot;
use crate::records::{DelayClass, RecordTable, STATUS_IN_TRANSIT_TO, STATUS_STOPPED_AT};

/// Dashboard indicator counts for one tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    pub timestamp: DateTime<Utc>,
    pub updated_at: String,
    pub total: usize,

    // vehicle status
    pub in_transit: usize,
    pub stopped: usize,
    pub fleet: usize,

    // delay class
    pub on_time: usize,
    pub late: usize,
}

impl FleetSummary {
    /// Counts status codes `2` and `1` exactly; vehicles reporting any other
    /// code (e.g. `0`, incoming) are in `total` but not in `fleet`.
    pub fn from_table(table: &RecordTable) -> Self {
        let mut s = FleetSummary {
            timestamp: Utc::now(),
            total: table.len(),
            ..Default::default()
        };

        for r in table {
            match r.current_status {
                STATUS_IN_TRANSIT_TO => s.in_transit += 1,
                STATUS_STOPPED_AT => s.stopped += 1,
                _ => {}
            }

            match r.delay_class {
                Some(DelayClass::OnTime) => s.on_time += 1,
                Some(DelayClass::Late) => s.late += 1,
                None => {}
            }
        }

        s.fleet = s.in_transit + s.stopped;
        s
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            updated_at: snapshot.updated_at.clone(),
            ..Self::from_table(&snapshot.records)
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn late_pct(&self) -> f64 {
        Self::pct(self.late, self.on_time + self.late)
    }
}
