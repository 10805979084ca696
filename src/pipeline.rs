//! Fetch → decode → extract for both feeds, then merge.
//!
//! Every failure is absorbed per feed: a feed that cannot be fetched or
//! decoded contributes no records, and [`Pipeline::poll`] always returns a
//! table.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::Url;
use serde::Serialize;
use tracing::{error, info};

use crate::clock::{cache_bust_token, format_update_time};
use crate::config::ResolvedConfig;
use crate::error::{ConfigError, FeedError};
use crate::extract::Extractor;
use crate::fetch::{HttpClient, build_client, fetch_feed};
use crate::gtfs_rt::FeedEntity;
use crate::merge::{merge, vehicles_only};
use crate::parser::{FeedKind, decode};
use crate::projection::Projector;
use crate::records::{DelayRecord, RecordTable, VehicleRecord};

/// One tick's output: the records plus the time they were gathered.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub updated_at: String,
    pub records: RecordTable,
}

pub struct Pipeline {
    client: Box<dyn HttpClient>,
    vehicle_positions_url: Url,
    trip_updates_url: Option<Url>,
    timezone: Tz,
    extractor: Extractor,
}

impl Pipeline {
    /// Builds the pipeline and its HTTP client from a resolved config.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ConfigError> {
        let client = build_client(&config.auth, config.request_timeout, config.connect_timeout)?;
        Ok(Self::with_client(client, config))
    }

    /// Same as [`Pipeline::from_config`] but with a caller-supplied client.
    pub fn with_client(client: Box<dyn HttpClient>, config: &ResolvedConfig) -> Self {
        Self {
            client,
            vehicle_positions_url: config.vehicle_positions_url.clone(),
            trip_updates_url: config.trip_updates_url.clone(),
            timezone: config.timezone,
            extractor: Extractor::new(Projector::new(), config.timezone, config.include_label),
        }
    }

    /// Runs both branches concurrently and joins their records.
    ///
    /// Without a trip-update feed every vehicle is returned with empty delay
    /// columns.
    #[tracing::instrument(skip(self))]
    pub async fn poll(&self, cache_bust: &str) -> RecordTable {
        let Some(trip_updates_url) = &self.trip_updates_url else {
            let vehicles = self.vehicles(cache_bust).await;
            let table = vehicles_only(&vehicles);
            info!(rows = table.len(), "Poll complete (vehicles only)");
            return table;
        };

        let (vehicles, delays) = tokio::join!(
            self.vehicles(cache_bust),
            self.delays(trip_updates_url, cache_bust)
        );

        let table = merge(&vehicles, &delays);
        info!(
            vehicles = vehicles.len(),
            delays = delays.len(),
            rows = table.len(),
            "Poll complete"
        );
        table
    }

    /// Polls with a token derived from `now` and stamps the result.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Snapshot {
        let records = self.poll(&cache_bust_token(now, self.timezone)).await;
        Snapshot {
            updated_at: format_update_time(now, self.timezone),
            records,
        }
    }

    pub async fn tick(&self) -> Snapshot {
        self.tick_at(Utc::now()).await
    }

    async fn vehicles(&self, cache_bust: &str) -> Vec<VehicleRecord> {
        let kind = FeedKind::VehiclePositions;
        match self.entities(kind, &self.vehicle_positions_url, cache_bust).await {
            Ok(entities) => self.extractor.extract_vehicles(&entities),
            Err(e) => {
                error!(error = %e, feed = %kind, "Feed unavailable this tick");
                Vec::new()
            }
        }
    }

    async fn delays(&self, url: &Url, cache_bust: &str) -> Vec<DelayRecord> {
        let kind = FeedKind::TripUpdates;
        match self.entities(kind, url, cache_bust).await {
            Ok(entities) => self.extractor.extract_delays(&entities),
            Err(e) => {
                error!(error = %e, feed = %kind, "Feed unavailable this tick");
                Vec::new()
            }
        }
    }

    async fn entities(
        &self,
        kind: FeedKind,
        url: &Url,
        cache_bust: &str,
    ) -> Result<Vec<FeedEntity>, FeedError> {
        let bytes = fetch_feed(self.client.as_ref(), kind, url, cache_bust).await?;
        Ok(decode(&bytes, kind)?.entity)
    }
}
