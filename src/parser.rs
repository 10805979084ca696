//! Protobuf decoder for GTFS Realtime feeds.

use std::fmt;

use prost::Message;
use tracing::debug;

use crate::error::FeedError;
use crate::gtfs_rt::FeedMessage;

/// Which of the two feeds a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum FeedKind {
    VehiclePositions,
    TripUpdates,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::VehiclePositions => f.write_str("vehicle positions"),
            FeedKind::TripUpdates => f.write_str("trip updates"),
        }
    }
}

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// The schema is the same for both feed kinds; `kind` only labels the error
/// and the log line. Empty input is a valid, empty feed.
///
/// # Errors
///
/// Returns [`FeedError::Decode`] if the bytes are not valid protobuf for a
/// `FeedMessage`.
#[tracing::instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn decode(bytes: &[u8], kind: FeedKind) -> Result<FeedMessage, FeedError> {
    let feed = FeedMessage::decode(bytes).map_err(|source| FeedError::Decode { kind, source })?;
    debug!(entity_count = feed.entity.len(), "Feed decoded");
    Ok(feed)
}
