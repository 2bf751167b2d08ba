//! # Jitter Detection
//!
//! Flags pings whose reported position is a measurement artifact rather than
//! true motion.
//!
//! ## Algorithm
//! 1. Derive per-segment distances, time deltas and bearings
//! 2. Derive speeds and bearing changes from them
//! 3. Evaluate three independent signals per ping:
//!    - **speed**: above the hard ceiling, or a robust speed z-score beyond the cutoff
//!    - **geometry**: a sharp bearing change while barely moving
//!    - **outlier**: the Hampel filter flags the latitude or longitude series
//! 4. Combine the signals with a [`VotePolicy`] (2 of 3 by default)
//! 5. Never report the first ping, which has no predecessor to measure from
//!
//! Sequences shorter than 3 pings are never flagged.

use log::debug;

use crate::config::CleanerConfig;
use crate::geo_utils::{bearing_changes, SegmentSeries};
use crate::stats::{hampel_outliers, robust_z_scores};
use crate::Ping;

/// The three per-ping jitter signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JitterSignals {
    /// Implausible speed (hard ceiling or robust z-score)
    pub speed: bool,
    /// Sharp direction change with negligible displacement
    pub geometry: bool,
    /// Hampel outlier in latitude or longitude
    pub outlier: bool,
}

impl JitterSignals {
    /// Number of signals that fired.
    pub fn count(&self) -> usize {
        [self.speed, self.geometry, self.outlier]
            .iter()
            .filter(|&&fired| fired)
            .count()
    }
}

/// Rule turning a ping's signals into a jitter verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotePolicy {
    /// Minimum number of signals that must fire
    pub min_votes: usize,
}

impl VotePolicy {
    /// At least 2 of the 3 signals.
    pub const MAJORITY: Self = Self { min_votes: 2 };

    /// Whether `signals` constitutes jitter under this policy.
    ///
    /// ```rust
    /// use gps_cleaner::{JitterSignals, VotePolicy};
    ///
    /// let one = JitterSignals { speed: true, ..Default::default() };
    /// let two = JitterSignals { speed: true, outlier: true, ..Default::default() };
    /// assert!(!VotePolicy::MAJORITY.is_jitter(&one));
    /// assert!(VotePolicy::MAJORITY.is_jitter(&two));
    /// ```
    pub fn is_jitter(&self, signals: &JitterSignals) -> bool {
        signals.count() >= self.min_votes
    }
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self::MAJORITY
    }
}

/// Evaluate the three jitter signals for every ping.
///
/// Returns one entry per ping. Sequences shorter than 3 pings get all-false
/// signals.
pub fn jitter_signals(points: &[Ping], config: &CleanerConfig) -> Vec<JitterSignals> {
    let n = points.len();
    if n < 3 {
        return vec![JitterSignals::default(); n];
    }

    let segments = SegmentSeries::from_pings(points);
    let speeds = segments.speeds_kmh();
    let changes = bearing_changes(&segments.bearings);
    let speed_z = robust_z_scores(&speeds);

    let lats: Vec<f64> = points.iter().map(|p| p.latitude).collect();
    let lons: Vec<f64> = points.iter().map(|p| p.longitude).collect();
    let lat_outliers = hampel_outliers(&lats, config.hampel_window_size, config.hampel_n_sigma);
    let lon_outliers = hampel_outliers(&lons, config.hampel_window_size, config.hampel_n_sigma);

    (0..n)
        .map(|i| JitterSignals {
            speed: speeds[i] > config.max_speed_kmh
                || speed_z[i].abs() > config.speed_mad_threshold,
            geometry: changes[i] > config.bearing_change_threshold_deg
                && segments.distances[i] < config.min_distance_meters,
            outlier: lat_outliers[i] || lon_outliers[i],
        })
        .collect()
}

/// Flag jittered pings using the majority vote.
///
/// The output has the same length and order as `points`; index 0 is always
/// `false`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use gps_cleaner::{detect_jitter, CleanerConfig, Ping};
///
/// let t = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
/// let pings = vec![
///     Ping::new("p1", t, 19.4591, 72.8852),
///     Ping::new("p2", t + Duration::seconds(60), 19.4599, 72.8860),
///     Ping::new("spike", t + Duration::seconds(64), 19.4700, 72.9000),
///     Ping::new("p3", t + Duration::seconds(120), 19.4607, 72.8866),
/// ];
///
/// let flags = detect_jitter(&pings, &CleanerConfig::default());
/// assert_eq!(flags, vec![false, false, true, false]);
/// ```
pub fn detect_jitter(points: &[Ping], config: &CleanerConfig) -> Vec<bool> {
    detect_jitter_with_policy(points, config, VotePolicy::MAJORITY)
}

/// Flag jittered pings using a custom [`VotePolicy`].
pub fn detect_jitter_with_policy(
    points: &[Ping],
    config: &CleanerConfig,
    policy: VotePolicy,
) -> Vec<bool> {
    let signals = jitter_signals(points, config);

    let mut flags: Vec<bool> = signals.iter().map(|s| policy.is_jitter(s)).collect();
    if let Some(first) = flags.first_mut() {
        *first = false;
    }

    debug!(
        "[Jitter] {} pings: speed={} geometry={} outlier={} -> {} flagged",
        points.len(),
        signals.iter().filter(|s| s.speed).count(),
        signals.iter().filter(|s| s.geometry).count(),
        signals.iter().filter(|s| s.outlier).count(),
        flags.iter().filter(|&&f| f).count()
    );

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap()
    }

    fn ping(id: &str, offset_secs: i64, lat: f64, lon: f64) -> Ping {
        Ping::new(id, base_time() + Duration::seconds(offset_secs), lat, lon)
    }

    fn spike_track() -> Vec<Ping> {
        vec![
            ping("p1", 0, 19.4591, 72.8852),
            ping("p2", 60, 19.4599, 72.8860),
            // ~2 km jump in 4 seconds
            ping("j1", 64, 19.4700, 72.9000),
            ping("p3", 120, 19.4607, 72.8866),
        ]
    }

    /// Steady eastward motion, ~11 m every 10 s.
    fn straight_track(n: usize) -> Vec<Ping> {
        (0..n)
            .map(|i| ping(&format!("p{}", i), i as i64 * 10, 19.4591, 72.8852 + i as f64 * 0.0001))
            .collect()
    }

    #[test]
    fn test_spike_flagged() {
        let flags = detect_jitter(&spike_track(), &CleanerConfig::default());
        assert_eq!(flags.len(), 4);
        assert!(flags[2]);
        assert!(!flags[0]);
        assert!(!flags[1]);
    }

    #[test]
    fn test_spike_signals() {
        let signals = jitter_signals(&spike_track(), &CleanerConfig::default());
        assert!(signals[2].speed);
        assert!(signals[2].outlier);
        assert!(!signals[2].geometry);
        assert_eq!(signals[2].count(), 2);
    }

    #[test]
    fn test_short_sequences_never_flagged() {
        let config = CleanerConfig::default();
        assert!(detect_jitter(&[], &config).is_empty());

        let track = spike_track();
        assert_eq!(detect_jitter(&track[..1], &config), vec![false]);
        assert_eq!(detect_jitter(&track[1..3], &config), vec![false, false]);
    }

    #[test]
    fn test_output_length_and_first_point() {
        let config = CleanerConfig::default();
        for n in 0..12 {
            let flags = detect_jitter(&straight_track(n), &config);
            assert_eq!(flags.len(), n);
            if n > 0 {
                assert!(!flags[0]);
            }
        }
    }

    #[test]
    fn test_straight_track_is_clean() {
        let flags = detect_jitter(&straight_track(10), &CleanerConfig::default());
        assert!(flags.iter().all(|&f| !f));
    }

    #[test]
    fn test_first_point_override() {
        // With no votes required every ping qualifies, except the first
        let track = straight_track(5);
        let policy = VotePolicy { min_votes: 0 };
        let flags = detect_jitter_with_policy(&track, &CleanerConfig::default(), policy);
        assert_eq!(flags, vec![false, true, true, true, true]);
    }

    #[test]
    fn test_geometry_signal_on_reversal_in_place() {
        // Creeps north, then hops back south by ~1 m: reversal with tiny movement
        let track = vec![
            ping("a", 0, 19.45910, 72.8852),
            ping("b", 10, 19.45920, 72.8852),
            ping("c", 20, 19.45930, 72.8852),
            ping("d", 30, 19.45929, 72.8852),
            ping("e", 40, 19.45940, 72.8852),
        ];
        let signals = jitter_signals(&track, &CleanerConfig::default());
        assert!(signals[3].geometry);
        assert!(!signals[1].geometry);
        assert!(!signals[2].geometry);
    }

    #[test]
    fn test_duplicate_timestamps_absorbed() {
        let track = vec![
            ping("a", 0, 19.4591, 72.8852),
            ping("b", 0, 19.4591, 72.8852),
            ping("c", 0, 19.4591, 72.8852),
            ping("d", 10, 19.4592, 72.8852),
        ];
        let flags = detect_jitter(&track, &CleanerConfig::default());
        assert_eq!(flags.len(), 4);
        assert!(!flags[0]);
    }

    #[test]
    fn test_signal_count() {
        assert_eq!(JitterSignals::default().count(), 0);
        let all = JitterSignals { speed: true, geometry: true, outlier: true };
        assert_eq!(all.count(), 3);
        assert!(VotePolicy::default().is_jitter(&all));
        assert!(!VotePolicy { min_votes: 4 }.is_jitter(&all));
    }
}
