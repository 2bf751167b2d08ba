//! JSON input and output for the pipeline.
//!
//! Input is a JSON array of pings:
//!
//! ```json
//! [{"id": "p1", "gpstime": "2025-11-13T01:00:00Z", "lat": 19.4591, "lon": 72.8852}]
//! ```
//!
//! Output is either the processed-result document ([`to_processed_json`]) or a
//! GeoJSON FeatureCollection for map display ([`to_geojson`]).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result};
use crate::pipeline::process;
use crate::{IdlingInterval, Ping, ProcessedResult};

/// A ping as it appears in input files, before normalisation.
#[derive(Debug, Deserialize)]
struct RawPing {
    id: Value,
    gpstime: String,
    lat: Value,
    lon: Value,
}

impl RawPing {
    fn into_ping(self) -> Result<Ping> {
        let id = match self.id {
            Value::String(s) => s,
            other => other.to_string(),
        };
        let timestamp = parse_timestamp(&self.gpstime)?;
        let latitude = coordinate(&id, "lat", &self.lat)?;
        let longitude = coordinate(&id, "lon", &self.lon)?;
        Ok(Ping::new(id, timestamp, latitude, longitude))
    }
}

fn coordinate(id: &str, field: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CleanerError::InvalidInput(format!("ping {} has non-numeric {}: {}", id, field, value))
    })
}

/// Offset-carrying ISO-8601 forms beyond RFC 3339: basic format, `+hhmm`
/// offsets, minute precision. `%#z` also accepts `Z`.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

/// Forms without an offset, read as UTC.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Parse an ISO-8601 timestamp.
///
/// Offsets are converted to UTC; a timestamp without an offset is taken as
/// UTC, and a bare date as midnight UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date.and_time(NaiveTime::MIN).and_utc());
        }
    }
    Err(CleanerError::InvalidTimestamp(text.to_string()))
}

/// Parse a JSON array of pings and sort it by timestamp.
///
/// The sort is stable, so pings sharing a timestamp keep their file order.
pub fn parse_pings(json: &str) -> Result<Vec<Ping>> {
    let raw: Vec<RawPing> = serde_json::from_str(json)?;
    let mut points = raw
        .into_iter()
        .map(RawPing::into_ping)
        .collect::<Result<Vec<_>>>()?;
    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}

/// Read a JSON ping file, see [`parse_pings`].
pub fn load_pings(path: impl AsRef<Path>) -> Result<Vec<Ping>> {
    let text = fs::read_to_string(path.as_ref())?;
    let points = parse_pings(&text)?;
    debug!("[GpsCleaner] Loaded {} pings from {}", points.len(), path.as_ref().display());
    Ok(points)
}

/// Write pretty-printed JSON, creating parent directories as needed.
pub fn save_json(path: impl AsRef<Path>, value: &Value) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn ping_json(p: &Ping) -> Value {
    json!({
        "id": p.id,
        "gpstime": timestamp(&p.timestamp),
        "lat": p.latitude,
        "lon": p.longitude,
    })
}

fn idling_json(interval: &IdlingInterval) -> Value {
    json!({
        "lat": interval.centroid.latitude,
        "lon": interval.centroid.longitude,
        "start_time": timestamp(&interval.start_time),
        "end_time": timestamp(&interval.end_time),
        "duration_sec": interval.duration_sec,
        "count": interval.count,
    })
}

/// Render a result as `{raw_points, cleaned_points, jitter_point_ids, idling_points}`.
pub fn to_processed_json(result: &ProcessedResult) -> Value {
    json!({
        "raw_points": result.raw_points.iter().map(ping_json).collect::<Vec<_>>(),
        "cleaned_points": result.cleaned_points.iter().map(ping_json).collect::<Vec<_>>(),
        "jitter_point_ids": result.jitter_point_ids,
        "idling_points": result.idling_intervals.iter().map(idling_json).collect::<Vec<_>>(),
    })
}

/// Render a result as a GeoJSON FeatureCollection.
///
/// Features, in order: the raw route LineString, the cleaned route
/// LineString, one Point per jittered ping, one Point per idling interval.
pub fn to_geojson(result: &ProcessedResult) -> Value {
    let line = |points: &[Ping], layer: &str| {
        let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.longitude, p.latitude]).collect();
        json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coords },
            "properties": { "layer": layer },
        })
    };

    let jitter_ids: HashSet<&str> = result.jitter_point_ids.iter().map(String::as_str).collect();
    let mut features = vec![
        line(&result.raw_points, "raw_route"),
        line(&result.cleaned_points, "cleaned_route"),
    ];

    features.extend(
        result
            .raw_points
            .iter()
            .filter(|p| jitter_ids.contains(p.id.as_str()))
            .map(|p| {
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [p.longitude, p.latitude] },
                    "properties": {
                        "id": p.id,
                        "gpstime": timestamp(&p.timestamp),
                        "type": "jitter",
                    },
                })
            }),
    );

    features.extend(result.idling_intervals.iter().map(|interval| {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [interval.centroid.longitude, interval.centroid.latitude],
            },
            "properties": {
                "type": "idling",
                "start_time": timestamp(&interval.start_time),
                "end_time": timestamp(&interval.end_time),
                "duration_sec": interval.duration_sec,
                "count": interval.count,
            },
        })
    }));

    json!({ "type": "FeatureCollection", "features": features })
}

/// Load config and pings, run the pipeline and write the processed JSON.
///
/// With no `config_path` the default thresholds are used.
pub fn run_pipeline(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config_path: Option<&Path>,
) -> Result<ProcessedResult> {
    let config = match config_path {
        Some(path) => CleanerConfig::load(path)?,
        None => CleanerConfig::default(),
    };
    let points = load_pings(input_path.as_ref())?;
    let result = process(points, &config)?;

    save_json(output_path.as_ref(), &to_processed_json(&result))?;
    info!("[GpsCleaner] Wrote {}", output_path.as_ref().display());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"[
        {"id": "p3", "gpstime": "2025-11-13T01:02:00Z", "lat": 19.4607, "lon": 72.8866},
        {"id": "p1", "gpstime": "2025-11-13T01:00:00Z", "lat": 19.4591, "lon": 72.8852},
        {"id": 2, "gpstime": "2025-11-13T06:31:00+05:30", "lat": "19.4599", "lon": 72.8860},
        {"id": "j1", "gpstime": "2025-11-13T01:01:04", "lat": 19.4700, "lon": 72.9000}
    ]"#;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gps-cleaner-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-11-13T01:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-11-13T06:30:00+05:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-11-13T01:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-11-13 01:00:00.000").unwrap(), expected);
        assert!(matches!(parse_timestamp("yesterday"), Err(CleanerError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_parse_timestamp_iso8601_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
        for text in [
            "2025-11-13T01:00Z",
            "2025-11-13T06:30:00+0530",
            "2025-11-13T06:30+05:30",
            "20251113T010000Z",
            "20251113T063000+0530",
            "20251113T0100Z",
        ] {
            let parsed = parse_timestamp(text).unwrap_or_else(|e| panic!("{}: {}", text, e));
            assert_eq!(parsed, expected, "{}", text);
        }

        // Without an offset: UTC; a bare date: midnight UTC
        assert_eq!(parse_timestamp("2025-11-13T01:00").unwrap(), expected);
        assert_eq!(parse_timestamp("20251113T010000").unwrap(), expected);
        let midnight = Utc.with_ymd_and_hms(2025, 11, 13, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-11-13").unwrap(), midnight);
        assert_eq!(parse_timestamp("20251113").unwrap(), midnight);

        let micros = parse_timestamp("2025-11-13T01:00:00.123456Z").unwrap();
        assert_eq!((micros - expected).num_microseconds(), Some(123_456));
    }

    #[test]
    fn test_parse_pings_sorts_and_normalises() {
        let points = parse_pings(SAMPLE).unwrap();
        let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "2", "j1", "p3"]);
        assert_eq!(points[1].latitude, 19.4599);
    }

    #[test]
    fn test_parse_pings_rejects_bad_coordinate() {
        let json =
            r#"[{"id": "x", "gpstime": "2025-11-13T01:00:00Z", "lat": "north", "lon": 1.0}]"#;
        assert!(matches!(parse_pings(json), Err(CleanerError::InvalidInput(_))));
        assert!(matches!(parse_pings("{}"), Err(CleanerError::Json(_))));
    }

    #[test]
    fn test_processed_json_shape() {
        let points = parse_pings(SAMPLE).unwrap();
        let result = process(points, &CleanerConfig::default()).unwrap();
        let doc = to_processed_json(&result);

        assert_eq!(doc["raw_points"].as_array().unwrap().len(), 4);
        assert_eq!(doc["cleaned_points"].as_array().unwrap().len(), 3);
        assert_eq!(doc["jitter_point_ids"], json!(["j1"]));
        assert!(doc["idling_points"].as_array().unwrap().is_empty());
        assert_eq!(doc["raw_points"][0]["gpstime"], "2025-11-13T01:00:00+00:00");
        assert_eq!(doc["raw_points"][0]["id"], "p1");
    }

    #[test]
    fn test_geojson_layers() {
        let points = parse_pings(SAMPLE).unwrap();
        let result = process(points, &CleanerConfig::default()).unwrap();
        let fc = to_geojson(&result);

        assert_eq!(fc["type"], "FeatureCollection");
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["properties"]["layer"], "raw_route");
        assert_eq!(features[0]["geometry"]["coordinates"].as_array().unwrap().len(), 4);
        assert_eq!(features[1]["properties"]["layer"], "cleaned_route");
        assert_eq!(features[2]["properties"]["type"], "jitter");
        assert_eq!(features[2]["properties"]["id"], "j1");
        // [lon, lat]
        assert_eq!(features[2]["geometry"]["coordinates"], json!([72.9, 19.47]));
    }

    #[test]
    fn test_run_pipeline_writes_output() {
        let dir = scratch_dir("run");
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("raw.json");
        let config = dir.join("config.json");
        let output = dir.join("nested").join("processed.json");
        fs::write(&input, SAMPLE).unwrap();
        fs::write(&config, r#"{"ema_alpha": 0.5}"#).unwrap();

        let result = run_pipeline(&input, &output, Some(config.as_path())).unwrap();
        assert_eq!(result.raw_points.len(), 4);
        assert!(result.cleaned_points.len() <= result.raw_points.len());

        let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["jitter_point_ids"], json!(["j1"]));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_run_pipeline_missing_input() {
        let dir = scratch_dir("missing");
        let result = run_pipeline(dir.join("nope.json"), dir.join("out.json"), None);
        assert!(matches!(result, Err(CleanerError::Io(_))));
    }
}
