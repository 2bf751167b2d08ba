//! Basic example of cleaning a short GPS track.
//!
//! Run with: cargo run --example basic_cleaning

use chrono::{Duration, TimeZone, Utc};
use gps_cleaner::{process, CleanerConfig, Ping};

fn main() {
    let start = Utc.with_ymd_and_hms(2025, 11, 13, 1, 0, 0).unwrap();
    let at = |secs: i64| start + Duration::seconds(secs);

    // Drive north, a spike, a parking stop, then drive on
    let pings = vec![
        Ping::new("p1", at(0), 19.4591, 72.8852),
        Ping::new("p2", at(60), 19.4599, 72.8860),
        Ping::new("spike", at(64), 19.4700, 72.9000),
        Ping::new("p3", at(120), 19.4607, 72.8866),
        Ping::new("stop1", at(180), 19.4608, 72.8866),
        Ping::new("stop2", at(300), 19.4608, 72.8866),
        Ping::new("stop3", at(420), 19.4608, 72.8866),
        Ping::new("p4", at(480), 19.4620, 72.8875),
    ];

    let config = CleanerConfig::default();
    println!("GPS Cleaning Example\n");
    println!(
        "Config: max_speed={}km/h, hampel_window={}, ema_alpha={}, idle<{}km/h for {}s\n",
        config.max_speed_kmh,
        config.hampel_window_size,
        config.ema_alpha,
        config.idle_speed_kmh,
        config.idle_min_duration_sec
    );

    let result = match process(pings, &config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Cleaning failed: {}", e);
            return;
        }
    };

    println!("Jitter: {:?}\n", result.jitter_point_ids);

    println!("Cleaned track:");
    for p in &result.cleaned_points {
        println!("   {} {} ({:.6}, {:.6})", p.id, p.timestamp, p.latitude, p.longitude);
    }

    println!("\nIdling intervals:");
    for idle in &result.idling_intervals {
        println!(
            "   {} -> {} ({:.0}s, {} pings) at ({:.6}, {:.6})",
            idle.start_time, idle.end_time, idle.duration_sec, idle.count,
            idle.centroid.latitude, idle.centroid.longitude
        );
    }
}
