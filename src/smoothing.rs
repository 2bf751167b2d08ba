//! Route smoothing over the non-jittered pings.
//!
//! Jittered pings are dropped, then latitude and longitude of the survivors
//! are smoothed as two independent EMA series. Ids and timestamps are carried
//! through unchanged.

use log::warn;

use crate::error::{CleanerError, Result};
use crate::stats::ema;
use crate::Ping;

/// Drop jittered pings and EMA-smooth the remaining positions.
///
/// `jitter_flags` must be parallel to `points`; a length mismatch is
/// rejected with [`CleanerError::InvalidInput`], as is a non-finite `alpha`.
/// Returns an empty sequence
/// when every ping is flagged.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use gps_cleaner::{smooth_route, Ping};
///
/// let t = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
/// let pings = vec![
///     Ping::new("a", t, 0.0, 0.0),
///     Ping::new("b", t + Duration::seconds(10), 50.0, 50.0),
///     Ping::new("c", t + Duration::seconds(20), 10.0, 20.0),
/// ];
///
/// let cleaned = smooth_route(&pings, &[false, true, false], 0.5).unwrap();
/// assert_eq!(cleaned.len(), 2);
/// assert_eq!(cleaned[1].id, "c");
/// assert_eq!(cleaned[1].latitude, 5.0);
/// assert_eq!(cleaned[1].longitude, 10.0);
/// ```
pub fn smooth_route(points: &[Ping], jitter_flags: &[bool], alpha: f64) -> Result<Vec<Ping>> {
    if points.len() != jitter_flags.len() {
        return Err(CleanerError::InvalidInput(format!(
            "{} jitter flags for {} pings",
            jitter_flags.len(),
            points.len()
        )));
    }
    if !alpha.is_finite() {
        return Err(CleanerError::InvalidInput(format!("EMA alpha must be finite, got {}", alpha)));
    }
    if !(0.0..=1.0).contains(&alpha) {
        warn!("[Smoothing] EMA alpha {} outside [0, 1], clamping", alpha);
    }

    let kept: Vec<&Ping> = points
        .iter()
        .zip(jitter_flags)
        .filter_map(|(p, &flagged)| (!flagged).then_some(p))
        .collect();
    if kept.is_empty() {
        return Ok(vec![]);
    }

    let lats: Vec<f64> = kept.iter().map(|p| p.latitude).collect();
    let lons: Vec<f64> = kept.iter().map(|p| p.longitude).collect();
    let smoothed_lats = ema(&lats, alpha);
    let smoothed_lons = ema(&lons, alpha);

    Ok(kept
        .iter()
        .zip(smoothed_lats.into_iter().zip(smoothed_lons))
        .map(|(p, (lat, lon))| p.with_position(lat, lon))
        .collect())
}
