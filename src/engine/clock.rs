use chrono::Utc;

/// Current UTC time as fractional epoch seconds, microsecond resolution.
pub fn utc_timestamp() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}
