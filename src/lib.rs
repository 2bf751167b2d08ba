//! # GPS Cleaner
//!
//! Cleans noisy GPS trajectories recorded by a single moving object.
//!
//! This library provides:
//! - Jitter detection combining robust speed statistics, a bearing-reversal
//!   heuristic and a Hampel filter on the coordinates
//! - Route smoothing with an exponential moving average over non-jittered pings
//! - Idling detection (stationary intervals with a representative centroid)
//!
//! ## Features
//!
//! - **`parallel`** - Run jitter/smoothing and idling detection concurrently with rayon
//! - **`serde`** - Serialize/Deserialize derives for the value types and config
//! - **`io`** - JSON ingestion, processed-JSON and GeoJSON output, config files
//! - **`cli`** - The `gps-cleaner` command-line binary
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use gps_cleaner::{process, CleanerConfig, Ping};
//!
//! let start = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
//! let pings = vec![
//!     Ping::new("p1", start, 19.4591, 72.8852),
//!     Ping::new("p2", start + Duration::minutes(1), 19.4592, 72.8853),
//!     Ping::new("p3", start + Duration::minutes(3), 19.4592, 72.8853),
//!     Ping::new("p4", start + Duration::minutes(5), 19.4592, 72.8853),
//!     Ping::new("p5", start + Duration::minutes(7), 19.4600, 72.8860),
//! ];
//!
//! let result = process(pings, &CleanerConfig::default()).unwrap();
//! assert_eq!(result.idling_intervals.len(), 1);
//! assert!(result.cleaned_points.len() <= result.raw_points.len());
//! ```

use chrono::{DateTime, Utc};

// Error handling
pub mod error;
pub use error::{CleanerError, Result};

// Threshold configuration
pub mod config;
pub use config::CleanerConfig;

// Geodesy and per-segment derivations
pub mod geo_utils;

// Robust statistics and filters
pub mod stats;

// Jitter detection (three signals + voting)
pub mod jitter;
pub use jitter::{detect_jitter, JitterSignals, VotePolicy};

// EMA route smoothing
pub mod smoothing;
pub use smoothing::smooth_route;

// Stationary interval detection
pub mod idling;
pub use idling::detect_idling;

// Orchestration
pub mod pipeline;
pub use pipeline::process;
#[cfg(feature = "parallel")]
pub use pipeline::process_parallel;

// JSON / GeoJSON input and output
#[cfg(feature = "io")]
pub mod io;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use gps_cleaner::GpsPoint;
/// let point = GpsPoint::new(19.4591, 72.8852);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A single position report from the tracked object.
///
/// Sequences of pings are expected in non-decreasing timestamp order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ping {
    /// Opaque identifier, carried through to the cleaned output
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Ping {
    /// Create a new ping.
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            latitude,
            longitude,
        }
    }

    /// The ping's position.
    pub fn point(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Same id and timestamp at a different position.
    pub fn with_position(&self, latitude: f64, longitude: f64) -> Self {
        Self {
            id: self.id.clone(),
            timestamp: self.timestamp,
            latitude,
            longitude,
        }
    }
}

/// A stationary interval found by [`detect_idling`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdlingInterval {
    /// Arithmetic mean of the member positions
    pub centroid: GpsPoint,
    /// Timestamp of the first member ping
    pub start_time: DateTime<Utc>,
    /// Timestamp of the last member ping
    pub end_time: DateTime<Utc>,
    /// Accumulated time between member pings (seconds)
    pub duration_sec: f64,
    /// Number of member pings
    pub count: usize,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessedResult {
    /// The input pings, unchanged
    pub raw_points: Vec<Ping>,
    /// Non-jittered pings with smoothed positions
    pub cleaned_points: Vec<Ping>,
    /// Ids of pings flagged as jitter, in input order
    pub jitter_point_ids: Vec<String>,
    /// Idling intervals, ordered by start time
    pub idling_intervals: Vec<IdlingInterval>,
}

// ============================================================================
// Tests
// ============================================================================
