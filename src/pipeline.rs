//! Pipeline orchestration.
//!
//! Sequences the detectors over one ping sequence:
//! raw pings -> jitter flags -> cleaned pings, and independently
//! raw pings -> idling intervals. Each call owns its input and returns a
//! fresh [`ProcessedResult`]; nothing is shared between runs.

use std::time::Instant;

use log::{info, warn};

use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result};
use crate::geo_utils::polyline_length;
use crate::idling::detect_idling;
use crate::jitter::detect_jitter;
use crate::smoothing::smooth_route;
use crate::{GpsPoint, Ping, ProcessedResult};

/// Reject pings with non-finite or out-of-range coordinates.
///
/// Timestamps out of order are tolerated (the detectors clamp negative time
/// deltas to zero) but logged.
pub fn validate_pings(points: &[Ping]) -> Result<()> {
    if let Some(bad) = points.iter().find(|p| !p.point().is_valid()) {
        return Err(CleanerError::InvalidInput(format!(
            "ping {} has invalid coordinates ({}, {})",
            bad.id, bad.latitude, bad.longitude
        )));
    }

    let out_of_order = points
        .windows(2)
        .filter(|w| w[1].timestamp < w[0].timestamp)
        .count();
    if out_of_order > 0 {
        warn!(
            "[GpsCleaner] {} pings are earlier than their predecessor; input should be time-sorted",
            out_of_order
        );
    }

    Ok(())
}

/// Run jitter detection, smoothing and idling detection over one track.
///
/// Validates `config` and `points` first; the detectors themselves never fail.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use gps_cleaner::{process, CleanerConfig, Ping};
///
/// let t = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
/// let pings = vec![
///     Ping::new("p1", t, 19.4591, 72.8852),
///     Ping::new("p2", t + Duration::seconds(60), 19.4599, 72.8860),
///     Ping::new("spike", t + Duration::seconds(64), 19.4700, 72.9000),
///     Ping::new("p3", t + Duration::seconds(120), 19.4607, 72.8866),
/// ];
///
/// let result = process(pings, &CleanerConfig::default()).unwrap();
/// assert_eq!(result.jitter_point_ids, vec!["spike".to_string()]);
/// assert_eq!(result.cleaned_points.len(), 3);
/// ```
pub fn process(points: Vec<Ping>, config: &CleanerConfig) -> Result<ProcessedResult> {
    config.validate()?;
    validate_pings(&points)?;
    let start = Instant::now();

    let (cleaned_points, jitter_point_ids) = clean_track(&points, config)?;
    let idling_intervals = detect_idling(&points, config);

    let result = ProcessedResult {
        raw_points: points,
        cleaned_points,
        jitter_point_ids,
        idling_intervals,
    };
    log_summary(&result, start);
    Ok(result)
}

/// Same as [`process`], running the jitter/smoothing chain and the idling
/// pass concurrently with rayon. Results are identical.
#[cfg(feature = "parallel")]
pub fn process_parallel(points: Vec<Ping>, config: &CleanerConfig) -> Result<ProcessedResult> {
    config.validate()?;
    validate_pings(&points)?;
    let start = Instant::now();

    let (cleaned, idling_intervals) = rayon::join(
        || clean_track(&points, config),
        || detect_idling(&points, config),
    );
    let (cleaned_points, jitter_point_ids) = cleaned?;

    let result = ProcessedResult {
        raw_points: points,
        cleaned_points,
        jitter_point_ids,
        idling_intervals,
    };
    log_summary(&result, start);
    Ok(result)
}

/// Jitter flags followed by smoothing; returns (cleaned pings, jittered ids).
fn clean_track(points: &[Ping], config: &CleanerConfig) -> Result<(Vec<Ping>, Vec<String>)> {
    let flags = detect_jitter(points, config);
    let jitter_ids = points
        .iter()
        .zip(&flags)
        .filter_map(|(p, &flagged)| flagged.then(|| p.id.clone()))
        .collect();
    let cleaned = smooth_route(points, &flags, config.ema_alpha)?;
    Ok((cleaned, jitter_ids))
}

fn log_summary(result: &ProcessedResult, start: Instant) {
    let raw_length = polyline_length(&positions(&result.raw_points));
    let cleaned_length = polyline_length(&positions(&result.cleaned_points));
    let idle_secs: f64 = result.idling_intervals.iter().map(|i| i.duration_sec).sum();

    info!(
        "[GpsCleaner] {} pings -> {} jitter, {} cleaned ({:.0}m -> {:.0}m), \
         {} idling intervals ({:.0}s) in {:?}",
        result.raw_points.len(),
        result.jitter_point_ids.len(),
        result.cleaned_points.len(),
        raw_length,
        cleaned_length,
        result.idling_intervals.len(),
        idle_secs,
        start.elapsed()
    );
}

fn positions(points: &[Ping]) -> Vec<GpsPoint> {
    points.iter().map(Ping::point).collect()
}
