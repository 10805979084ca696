//! Geographic (EPSG:4326) to Web Mercator (EPSG:3857) reprojection.

use std::f64::consts::PI;

use serde::Serialize;

/// Semi-major axis of the WGS84 ellipsoid, used as the sphere radius by
/// Web Mercator.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes square. Inputs beyond it are clamped.
pub const MAX_LATITUDE_DEG: f64 = 85.051_128_779_806_59;

/// A planar map coordinate in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

/// Converts longitude/latitude pairs into Web Mercator metres.
///
/// Input order is always `(longitude, latitude)`. The projector holds no
/// state, so one instance can be shared by every task.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector;

impl Projector {
    pub fn new() -> Self {
        Self
    }

    pub fn project(&self, longitude: f64, latitude: f64) -> MapPoint {
        let lat = latitude.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG);

        let x = EARTH_RADIUS_M * longitude.to_radians();
        let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();

        MapPoint { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-6 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_project_rome() {
        let p = Projector::new().project(12.4964, 41.9028);
        assert_close(p.x, 1_391_092.884_749);
        assert_close(p.y, 5_146_430.457_427);
    }

    #[test]
    fn test_project_origin() {
        let p = Projector::new().project(0.0, 0.0);
        assert_close(p.x, 0.0);
        assert_close(p.y, 0.0);
    }

    #[test]
    fn test_project_antimeridian() {
        let p = Projector::new().project(180.0, 0.0);
        assert_close(p.x, 20_037_508.342_789);
    }

    #[test]
    fn test_project_is_deterministic() {
        let projector = Projector::new();
        assert_eq!(projector.project(12.5, 41.9), projector.project(12.5, 41.9));
    }

    #[test]
    fn test_project_pole_is_clamped() {
        let p = Projector::new().project(0.0, 90.0);
        assert!(p.y.is_finite());
        assert_close(p.y, 20_037_508.342_789);

        let south = Projector::new().project(0.0, -90.0);
        assert_close(south.y, -20_037_508.342_789);
    }
}
