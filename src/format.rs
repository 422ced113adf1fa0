//! Human-readable renderings of sizes, durations and timestamps.

use chrono::{Local, TimeZone};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// `1536` -> `"1.50 KB"`. Binary multiples, two decimals, capped at TB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Byte".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

/// `3725.4` -> `"1h 2m 5s"`; leading zero components are left out.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Local date and time of an epoch timestamp, e.g. `"March 4, 2024, 13:05:09"`. Values below
/// one second (unknown dates) render empty.
pub fn format_date(epoch_seconds: f64) -> String {
    if !(epoch_seconds >= 1.0) {
        return String::new();
    }
    match Local.timestamp_opt(epoch_seconds.floor() as i64, 0).single() {
        Some(dt) => dt.format("%B %-d, %Y, %H:%M:%S").to_string(),
        None => String::new(),
    }
}
