//! Error types for the feed pipeline.
//!
//! [`FeedError`] covers everything that can go wrong while turning one feed
//! into records. The pipeline absorbs these at the branch boundary, so they
//! only reach callers that use the lower-level functions directly.

use thiserror::Error;

use crate::parser::FeedKind;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch {kind} feed from {url}: {source}")]
    Fetch {
        kind: FeedKind,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode {kind} feed: {source}")]
    Decode {
        kind: FeedKind,
        #[source]
        source: prost::DecodeError,
    },

    #[error("trip update {entity_id} (trip {trip_id:?}) has no stop time updates")]
    MissingStopTimeUpdate { entity_id: String, trip_id: String },
}

/// Problems found while loading or validating [`crate::config::PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feed url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    #[error("poll interval must be at least one second")]
    ZeroInterval,

    #[error("{0} must be at least one second")]
    ZeroTimeout(&'static str),

    #[error("invalid auth header {0:?}")]
    InvalidHeader(String),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
