//! Clean a long synthetic track with the parallel pipeline.
//!
//! Run with: cargo run --example parallel_cleaning --features parallel

use std::time::Instant;

use chrono::{Duration, TimeZone, Utc};
use gps_cleaner::{process, process_parallel, CleanerConfig, Ping};

fn main() {
    let pings = synthetic_track(50_000);
    let config = CleanerConfig::default();

    println!("Created {} pings\n", pings.len());

    let start = Instant::now();
    let sequential = match process(pings.clone(), &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Cleaning failed: {}", e);
            return;
        }
    };
    println!("Sequential: {:?}", start.elapsed());

    let start = Instant::now();
    let parallel = match process_parallel(pings, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Cleaning failed: {}", e);
            return;
        }
    };
    println!("Parallel:   {:?}\n", start.elapsed());

    println!("Stats:");
    println!("  Jitter pings: {}", parallel.jitter_point_ids.len());
    println!("  Cleaned pings: {}", parallel.cleaned_points.len());
    println!("  Idling intervals: {}", parallel.idling_intervals.len());
    println!("  Identical results: {}", sequential == parallel);
}

/// Drive at ~40 km/h with a spike every 97 pings and a 5 minute stop every 1000.
fn synthetic_track(n: usize) -> Vec<Ping> {
    let start = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
    let mut t = 0i64;
    let mut lat = 19.4591;

    (0..n)
        .map(|i| {
            let parked = i % 1000 >= 990;
            t += if parked { 30 } else { 10 };
            if !parked {
                lat += 0.001;
            }
            if i % 97 == 50 {
                Ping::new(format!("spike{}", i), start + Duration::seconds(t), lat + 0.02, 72.9)
            } else {
                Ping::new(format!("p{}", i), start + Duration::seconds(t), lat, 72.8852)
            }
        })
        .collect()
}
