//! # Idling Detection
//!
//! Finds intervals where the object is stationary: maximal runs of pings with
//! speed below `idle_speed_kmh` lasting at least `idle_min_duration_sec`.
//!
//! ## Algorithm
//! 1. Attribute each segment's speed to the later ping of the segment
//! 2. Scan left to right for maximal runs of slow pings
//! 3. Accumulate the time between consecutive run members
//! 4. Emit the run if it lasts long enough, then continue after it
//!
//! The first ping has no predecessor, so its speed is unknown. It is not
//! eligible to start a run; otherwise every track would begin "idle".
//! Runs are consumed whether or not they pass the duration gate, so emitted
//! intervals are disjoint and ordered by start time.

use log::debug;

use crate::config::CleanerConfig;
use crate::geo_utils::{compute_center, SegmentSeries};
use crate::{GpsPoint, IdlingInterval, Ping};

/// Detect idling intervals using `idle_speed_kmh` and `idle_min_duration_sec`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use gps_cleaner::{detect_idling, CleanerConfig, Ping};
///
/// let t = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
/// let pings = vec![
///     Ping::new("p1", t, 19.4591, 72.8852),
///     Ping::new("p2", t + Duration::minutes(1), 19.4592, 72.8853),
///     Ping::new("p3", t + Duration::minutes(3), 19.4592, 72.8853),
///     Ping::new("p4", t + Duration::minutes(5), 19.4592, 72.8853),
///     Ping::new("p5", t + Duration::minutes(7), 19.4600, 72.8860),
/// ];
///
/// let intervals = detect_idling(&pings, &CleanerConfig::default());
/// assert_eq!(intervals.len(), 1);
/// assert_eq!(intervals[0].count, 3);
/// assert_eq!(intervals[0].duration_sec, 240.0);
/// ```
pub fn detect_idling(points: &[Ping], config: &CleanerConfig) -> Vec<IdlingInterval> {
    let n = points.len();
    if n < 2 {
        return vec![];
    }

    let segments = SegmentSeries::from_pings(points);
    let speeds = segments.speeds_kmh();
    let is_slow = |i: usize| speeds[i] < config.idle_speed_kmh;

    let mut intervals = Vec::new();
    let mut i = 1;
    while i < n {
        if !is_slow(i) {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut duration = 0.0;
        while end + 1 < n && is_slow(end + 1) {
            end += 1;
            duration += segments.deltas[end];
        }

        if duration >= config.idle_min_duration_sec {
            let interval = build_interval(&points[start..=end], duration);
            debug!(
                "[Idling] {} pings idle for {:.0}s at ({:.6}, {:.6})",
                interval.count,
                interval.duration_sec,
                interval.centroid.latitude,
                interval.centroid.longitude
            );
            intervals.push(interval);
        }

        i = end + 1;
    }

    intervals
}

fn build_interval(run: &[Ping], duration_sec: f64) -> IdlingInterval {
    let positions: Vec<GpsPoint> = run.iter().map(Ping::point).collect();
    IdlingInterval {
        centroid: compute_center(&positions),
        start_time: run[0].timestamp,
        end_time: run[run.len() - 1].timestamp,
        duration_sec,
        count: run.len(),
    }
}
