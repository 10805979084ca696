use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prost::Message;
use rome_in_transit::config::{PipelineConfig, ResolvedConfig};
use rome_in_transit::fetch::HttpClient;
use rome_in_transit::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use rome_in_transit::gtfs_rt::{
    FeedEntity, FeedHeader, FeedMessage, Position, TripDescriptor, TripUpdate, VehicleDescriptor,
    VehiclePosition,
};
use rome_in_transit::pipeline::Pipeline;
use rome_in_transit::projection::Projector;
use rome_in_transit::records::{DelayClass, StatusClass};
use rome_in_transit::summary::FleetSummary;

const VEHICLES_PATH: &str = "/vehicle_positions.pb";
const TRIPS_PATH: &str = "/trip_updates.pb";

/// Serves canned feed bodies by path and records every requested url.
#[derive(Default)]
struct FakeFeeds {
    routes: HashMap<&'static str, (u16, Vec<u8>)>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FakeFeeds {
    fn serve(mut self, path: &'static str, status: u16, body: Vec<u8>) -> Self {
        self.routes.insert(path, (status, body));
        self
    }
}

#[async_trait]
impl HttpClient for FakeFeeds {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.seen.lock().unwrap().push(req.url().to_string());
        let (status, body) = self
            .routes
            .get(req.url().path())
            .cloned()
            .unwrap_or((404, Vec::new()));
        let resp = http::Response::builder().status(status).body(body).unwrap();
        Ok(reqwest::Response::from(resp))
    }
}

fn config(with_trip_updates: bool, include_label: bool) -> ResolvedConfig {
    PipelineConfig {
        vehicle_positions_url: format!("https://feeds.test{VEHICLES_PATH}"),
        trip_updates_url: with_trip_updates.then(|| format!("https://feeds.test{TRIPS_PATH}")),
        include_label,
        ..Default::default()
    }
    .resolve()
    .unwrap()
}

fn feed(entity: Vec<FeedEntity>) -> Vec<u8> {
    FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1_720_000_000),
            incrementality: None,
            feed_version: None,
        },
        entity,
    }
    .encode_to_vec()
}

fn vehicle(id: &str, trip_id: &str, status: i32, lon: f32, lat: f32) -> FeedEntity {
    FeedEntity {
        id: id.to_string(),
        vehicle: Some(VehiclePosition {
            trip: Some(TripDescriptor {
                trip_id: Some(trip_id.to_string()),
                start_time: Some("11:30:00".to_string()),
                ..Default::default()
            }),
            vehicle: Some(VehicleDescriptor {
                id: Some(format!("bus-{id}")),
                label: Some(format!("{id} ")),
                license_plate: None,
            }),
            position: Some(Position {
                latitude: lat,
                longitude: lon,
                bearing: None,
                odometer: None,
                speed: None,
            }),
            current_status: Some(status),
            timestamp: Some(1_720_000_000),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn trip_update(id: &str, trip_id: &str, delays: &[i32]) -> FeedEntity {
    FeedEntity {
        id: id.to_string(),
        trip_update: Some(TripUpdate {
            trip: TripDescriptor {
                trip_id: Some(trip_id.to_string()),
                ..Default::default()
            },
            stop_time_update: delays
                .iter()
                .map(|d| StopTimeUpdate {
                    arrival: Some(StopTimeEvent {
                        delay: Some(*d),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_single_trip() {
    let client = FakeFeeds::default()
        .serve(VEHICLES_PATH, 200, feed(vec![vehicle("1", "T1", 2, 12.5, 41.9)]))
        .serve(TRIPS_PATH, 200, feed(vec![trip_update("u1", "T1", &[120])]));
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    let table = pipeline.poll("11:46:40").await;

    assert_eq!(table.len(), 1);
    let r = &table.rows()[0];
    let expected = Projector::new().project(f64::from(12.5f32), f64::from(41.9f32));
    assert_eq!((r.x, r.y), (expected.x, expected.y));
    assert_eq!(r.trip_id, "T1");
    assert_eq!(r.vehicle_id, "bus-1");
    assert_eq!(r.last_update, "11:46:40");
    assert_eq!(r.current_status_class, StatusClass::InTransit);
    assert_eq!(r.delay, Some(2.0));
    assert_eq!(r.delay_class, Some(DelayClass::Late));
    assert_eq!(r.label, None);
}

#[tokio::test]
async fn test_both_requests_carry_cache_bust() {
    let client = FakeFeeds::default()
        .serve(VEHICLES_PATH, 200, feed(vec![]))
        .serve(TRIPS_PATH, 200, feed(vec![]));
    let seen = client.seen.clone();
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    pipeline.poll("tick-42").await;

    let mut urls = seen.lock().unwrap().clone();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://feeds.test/trip_updates.pb?cacheBust=tick-42",
            "https://feeds.test/vehicle_positions.pb?cacheBust=tick-42",
        ]
    );
}

#[tokio::test]
async fn test_join_drops_trips_missing_from_either_feed() {
    let client = FakeFeeds::default()
        .serve(
            VEHICLES_PATH,
            200,
            feed(vec![
                vehicle("1", "A ", 1, 12.5, 41.9),
                vehicle("2", "B", 2, 12.4, 41.8),
            ]),
        )
        .serve(
            TRIPS_PATH,
            200,
            feed(vec![
                trip_update("u1", "A", &[0]),
                trip_update("u2", "C", &[300]),
            ]),
        );
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    let table = pipeline.poll("t").await;

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].trip_id, "A");
    assert_eq!(table.rows()[0].current_status_class, StatusClass::Stopped);
    assert_eq!(table.rows()[0].delay_class, Some(DelayClass::OnTime));
}

#[tokio::test]
async fn test_vehicle_fetch_failure_yields_empty_table() {
    let client = FakeFeeds::default()
        .serve(VEHICLES_PATH, 500, Vec::new())
        .serve(TRIPS_PATH, 200, feed(vec![trip_update("u1", "T1", &[60])]));
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    let table = pipeline.poll("t").await;

    assert!(table.is_empty());
}

#[tokio::test]
async fn test_trip_feed_decode_failure_yields_empty_table() {
    let client = FakeFeeds::default()
        .serve(VEHICLES_PATH, 200, feed(vec![vehicle("1", "T1", 2, 12.5, 41.9)]))
        .serve(TRIPS_PATH, 200, vec![0xFF, 0xFE, 0x00, 0x01]);
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    assert!(pipeline.poll("t").await.is_empty());
}

#[tokio::test]
async fn test_unreachable_feeds_yield_empty_table() {
    // No routes: every request is a 404.
    let pipeline = Pipeline::with_client(Box::new(FakeFeeds::default()), &config(true, false));
    assert!(pipeline.poll("t").await.is_empty());
}

#[tokio::test]
async fn test_empty_payloads_are_stable_across_polls() {
    let client = FakeFeeds::default()
        .serve(VEHICLES_PATH, 200, Vec::new())
        .serve(TRIPS_PATH, 200, Vec::new());
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    let first = pipeline.poll("a").await;
    let second = pipeline.poll("b").await;

    assert!(first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_repeated_polls_return_identical_tables() {
    let client = FakeFeeds::default()
        .serve(
            VEHICLES_PATH,
            200,
            feed(vec![
                vehicle("1", "T1", 2, 12.5, 41.9),
                vehicle("2", "T2", 1, 12.45, 41.89),
            ]),
        )
        .serve(
            TRIPS_PATH,
            200,
            feed(vec![trip_update("u1", "T1", &[90]), trip_update("u2", "T2", &[-30])]),
        );
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    let first = pipeline.poll("a").await;
    let second = pipeline.poll("b").await;

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_trip_update_without_stop_times_is_skipped() {
    let client = FakeFeeds::default()
        .serve(
            VEHICLES_PATH,
            200,
            feed(vec![
                vehicle("1", "T1", 2, 12.5, 41.9),
                vehicle("2", "T2", 2, 12.5, 41.9),
            ]),
        )
        .serve(
            TRIPS_PATH,
            200,
            feed(vec![trip_update("u1", "T1", &[]), trip_update("u2", "T2", &[30])]),
        );
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));

    let table = pipeline.poll("t").await;

    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].trip_id, "T2");
    assert_eq!(table.rows()[0].delay, Some(0.5));
}

#[tokio::test]
async fn test_vehicles_only_mode_with_labels() {
    let client = FakeFeeds::default().serve(
        VEHICLES_PATH,
        200,
        feed(vec![vehicle("7", "T1", 1, 12.5, 41.9), vehicle("8", "", 2, 12.5, 41.9)]),
    );
    let seen = client.seen.clone();
    let pipeline = Pipeline::with_client(Box::new(client), &config(false, true));

    let table = pipeline.poll("t").await;

    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].label.as_deref(), Some("7"));
    assert!(table.iter().all(|r| r.delay.is_none()));
    assert_eq!(seen.lock().unwrap().len(), 1);

    let summary = FleetSummary::from_table(&table);
    assert_eq!((summary.stopped, summary.in_transit, summary.fleet), (1, 1, 2));
}

#[tokio::test]
async fn test_tick_stamps_local_time() {
    let client = FakeFeeds::default()
        .serve(VEHICLES_PATH, 200, feed(vec![]))
        .serve(TRIPS_PATH, 200, feed(vec![]));
    let seen = client.seen.clone();
    let pipeline = Pipeline::with_client(Box::new(client), &config(true, false));
    let now = DateTime::<Utc>::from_timestamp(1_720_000_000, 0).unwrap();

    let snapshot = pipeline.tick_at(now).await;

    assert_eq!(snapshot.updated_at, "03/07/2024 11:46:40");
    assert!(snapshot.records.is_empty());
    assert!(
        seen.lock()
            .unwrap()
            .iter()
            .all(|url| url.ends_with("?cacheBust=11%3A46%3A40"))
    );
}
