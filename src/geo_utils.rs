//! # Geographic Utilities
//!
//! Geodesy used by the detectors: distances, bearings and the per-segment
//! series derived from a ping sequence.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`bearing`] | Initial great-circle bearing in [0, 360) |
//! | [`angular_difference`] | Smallest difference between two bearings, in [0, 180] |
//! | [`speeds_kmh`] | Per-segment speed from distances and time deltas |
//! | [`bearing_changes`] | Change between consecutive bearings |
//! | [`compute_center`] | Arithmetic centroid of a set of points |
//! | [`polyline_length`] | Total length of a track in meters |
//!
//! ## Segment Convention
//!
//! Every per-segment series has one entry per ping. Entry `i` describes the
//! segment ending at ping `i`; entry 0 has no predecessor and holds 0.
//!
//! ## Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use chrono::{DateTime, Utc};
use geo::{Bearing, Haversine, Point};

use crate::{GpsPoint, Ping};

/// Mean Earth radius used by [`haversine_distance`] (meters).
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// m/s to km/h.
const MPS_TO_KMH: f64 = 3.6;

// =============================================================================
// Distance and Direction
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Returns the distance in meters on a sphere of radius [`EARTH_RADIUS_METERS`].
/// Symmetric, and exactly zero for identical points.
///
/// # Example
///
/// ```rust
/// use gps_cleaner::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let phi1 = p1.latitude.to_radians();
    let phi2 = p2.latitude.to_radians();
    let d_phi = (p2.latitude - p1.latitude).to_radians();
    let d_lambda = (p2.longitude - p1.longitude).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Initial bearing from `p1` towards `p2`, in degrees in [0, 360).
///
/// North is 0°, east is 90°. When the two points coincide the direction is
/// undefined and 0 is returned.
///
/// # Example
///
/// ```rust
/// use gps_cleaner::{GpsPoint, geo_utils};
///
/// let origin = GpsPoint::new(0.0, 0.0);
/// let east = GpsPoint::new(0.0, 1.0);
/// assert!((geo_utils::bearing(&origin, &east) - 90.0).abs() < 1e-9);
/// assert_eq!(geo_utils::bearing(&origin, &origin), 0.0);
/// ```
pub fn bearing(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    if p1 == p2 {
        return 0.0;
    }
    let origin = Point::new(p1.longitude, p1.latitude);
    let destination = Point::new(p2.longitude, p2.latitude);
    let degrees = Haversine::bearing(origin, destination).rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360.0
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Smallest absolute difference between two bearings, in degrees in [0, 180].
///
/// Symmetric in its arguments.
///
/// ```rust
/// use gps_cleaner::geo_utils::angular_difference;
///
/// assert_eq!(angular_difference(350.0, 10.0), 20.0);
/// assert_eq!(angular_difference(10.0, 350.0), 20.0);
/// assert_eq!(angular_difference(90.0, 270.0), 180.0);
/// ```
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs().rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

// =============================================================================
// Per-Segment Series
// =============================================================================

/// Seconds elapsed from `from` to `to` (negative if `to` is earlier).
#[inline]
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let elapsed = to - from;
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => elapsed.num_milliseconds() as f64 / 1000.0,
    }
}

/// Distances, non-negative time deltas and bearings for each segment of a track.
///
/// All three vectors have the same length as the ping sequence; index 0 is
/// all zeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentSeries {
    /// Distance from the previous ping (meters)
    pub distances: Vec<f64>,
    /// Time since the previous ping, clamped at 0 (seconds)
    pub deltas: Vec<f64>,
    /// Bearing from the previous ping (degrees)
    pub bearings: Vec<f64>,
}

impl SegmentSeries {
    /// Derive the segment series for a ping sequence.
    pub fn from_pings(points: &[Ping]) -> Self {
        let n = points.len();
        let mut series = Self {
            distances: Vec::with_capacity(n),
            deltas: Vec::with_capacity(n),
            bearings: Vec::with_capacity(n),
        };
        if n == 0 {
            return series;
        }

        series.distances.push(0.0);
        series.deltas.push(0.0);
        series.bearings.push(0.0);

        for w in points.windows(2) {
            let (prev, cur) = (w[0].point(), w[1].point());
            series.distances.push(haversine_distance(&prev, &cur));
            series.deltas.push(seconds_between(w[0].timestamp, w[1].timestamp).max(0.0));
            series.bearings.push(bearing(&prev, &cur));
        }

        series
    }

    /// Speed attributed to each ping (km/h), see [`speeds_kmh`].
    pub fn speeds_kmh(&self) -> Vec<f64> {
        speeds_kmh(&self.distances, &self.deltas)
    }
}

/// Elementwise speed in km/h from segment distances (meters) and time deltas (seconds).
///
/// A non-positive delta (duplicate or reversed timestamps) yields speed 0.
///
/// ```rust
/// use gps_cleaner::geo_utils::speeds_kmh;
///
/// let speeds = speeds_kmh(&[0.0, 100.0, 50.0], &[0.0, 10.0, 0.0]);
/// assert_eq!(speeds, vec![0.0, 36.0, 0.0]);
/// ```
pub fn speeds_kmh(distances: &[f64], deltas: &[f64]) -> Vec<f64> {
    distances
        .iter()
        .zip(deltas)
        .map(|(&d, &dt)| if dt <= 0.0 { 0.0 } else { d / dt * MPS_TO_KMH })
        .collect()
}

/// Angular change between consecutive bearings; the first entry is 0.
pub fn bearing_changes(bearings: &[f64]) -> Vec<f64> {
    if bearings.is_empty() {
        return vec![];
    }
    std::iter::once(0.0)
        .chain(bearings.windows(2).map(|w| angular_difference(w[1], w[0])))
        .collect()
}

// =============================================================================
// Aggregates
// =============================================================================

/// Calculate the total length of a polyline (GPS track) in meters.
///
/// Empty or single-point tracks return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Compute the centroid of a set of points.
///
/// Returns the arithmetic mean of all latitude and longitude values, or
/// (0, 0) for empty input. Suitable for the small extents of an idling
/// interval; not meaningful across the antimeridian.
///
/// # Example
///
/// ```rust
/// use gps_cleaner::{GpsPoint, geo_utils};
///
/// let points = vec![
///     GpsPoint::new(51.50, -0.10),
///     GpsPoint::new(51.52, -0.12),
/// ];
///
/// let center = geo_utils::compute_center(&points);
/// assert!((center.latitude - 51.51).abs() < 0.001);
/// assert!((center.longitude - (-0.11)).abs() < 0.001);
/// ```
pub fn compute_center(points: &[GpsPoint]) -> GpsPoint {
    if points.is_empty() {
        return GpsPoint::new(0.0, 0.0);
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    GpsPoint::new(sum_lat / n, sum_lng / n)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap()
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(19.4591, 72.8852);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_nearby_points() {
        let p1 = GpsPoint::new(19.4591066667, 72.8851966667);
        let p2 = GpsPoint::new(19.4599066667, 72.8858966667);
        let d = haversine_distance(&p1, &p2);
        assert!(d > 50.0 && d < 2000.0);
    }

    #[test]
    fn test_haversine_distance_symmetric() {
        let a = GpsPoint::new(51.5074, -0.1278);
        let b = GpsPoint::new(48.8566, 2.3522);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let d = haversine_distance(&GpsPoint::new(0.0, 0.0), &GpsPoint::new(1.0, 0.0));
        let expected = EARTH_RADIUS_METERS * 1.0_f64.to_radians();
        assert!(approx_eq(d, expected, 1e-6));
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GpsPoint::new(0.0, 0.0);
        assert!(approx_eq(bearing(&origin, &GpsPoint::new(1.0, 0.0)), 0.0, 1e-9));
        assert!(approx_eq(bearing(&origin, &GpsPoint::new(0.0, 1.0)), 90.0, 1e-9));
        assert!(approx_eq(bearing(&origin, &GpsPoint::new(-1.0, 0.0)), 180.0, 1e-9));
        assert!(approx_eq(bearing(&origin, &GpsPoint::new(0.0, -1.0)), 270.0, 1e-9));
    }

    #[test]
    fn test_bearing_range() {
        let b = bearing(&GpsPoint::new(19.4591, 72.8852), &GpsPoint::new(19.4607, 72.8866));
        assert!((0.0..360.0).contains(&b));
        let back = bearing(&GpsPoint::new(19.4607, 72.8866), &GpsPoint::new(19.4591, 72.8852));
        assert!((0.0..360.0).contains(&back));
        assert!(approx_eq(angular_difference(b, back), 180.0, 0.01));
    }

    #[test]
    fn test_angular_difference_properties() {
        assert_eq!(angular_difference(42.0, 42.0), 0.0);
        assert_eq!(angular_difference(0.0, 180.0), 180.0);
        assert_eq!(angular_difference(359.0, 1.0), 2.0);

        let pairs = [(12.3, 300.7), (0.1, 359.9), (170.0, 350.0), (45.5, 45.25)];
        for (a, b) in pairs {
            let d = angular_difference(a, b);
            assert_eq!(d, angular_difference(b, a));
            assert!((0.0..=180.0).contains(&d));
        }
    }

    #[test]
    fn test_speeds_zero_delta_guard() {
        let speeds = speeds_kmh(&[0.0, 10.0, 10.0, 10.0], &[0.0, 0.0, -5.0, 2.0]);
        assert_eq!(speeds, vec![0.0, 0.0, 0.0, 18.0]);
    }

    #[test]
    fn test_bearing_changes() {
        assert!(bearing_changes(&[]).is_empty());
        assert_eq!(bearing_changes(&[90.0]), vec![0.0]);
        assert_eq!(bearing_changes(&[0.0, 90.0, 350.0]), vec![0.0, 90.0, 100.0]);
    }

    #[test]
    fn test_segment_series_from_pings() {
        let t = base_time();
        let pings = vec![
            Ping::new("a", t, 0.0, 0.0),
            Ping::new("b", t + Duration::seconds(10), 0.0, 0.001),
            // Earlier timestamp: delta clamps to zero
            Ping::new("c", t + Duration::seconds(5), 0.0, 0.001),
        ];
        let series = SegmentSeries::from_pings(&pings);

        assert_eq!(series.distances.len(), 3);
        assert_eq!(series.distances[0], 0.0);
        assert_eq!(series.deltas, vec![0.0, 10.0, 0.0]);
        assert!(approx_eq(series.bearings[1], 90.0, 1e-6));
        assert_eq!(series.distances[2], 0.0);
        assert_eq!(series.bearings[2], 0.0);

        let speeds = series.speeds_kmh();
        assert!(approx_eq(speeds[1], series.distances[1] / 10.0 * 3.6, 1e-9));
        assert_eq!(speeds[2], 0.0);
    }

    #[test]
    fn test_segment_series_empty() {
        let series = SegmentSeries::from_pings(&[]);
        assert!(series.distances.is_empty());
        assert!(series.speeds_kmh().is_empty());
    }

    #[test]
    fn test_seconds_between_subsecond() {
        let t = base_time();
        assert_eq!(seconds_between(t, t + Duration::milliseconds(1500)), 1.5);
        assert_eq!(seconds_between(t + Duration::seconds(2), t), -2.0);
        assert_eq!(seconds_between(t, t + Duration::microseconds(250)), 0.00025);
    }

    #[test]
    fn test_polyline_length() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[GpsPoint::new(51.5074, -0.1278)]), 0.0);

        let track = vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5080, -0.1280),
        ];
        let length = polyline_length(&track);
        assert!(length > 0.0 && length < 100.0);
    }

    #[test]
    fn test_compute_center_empty() {
        let center = compute_center(&[]);
        assert_eq!(center.latitude, 0.0);
        assert_eq!(center.longitude, 0.0);
    }
}
