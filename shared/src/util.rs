/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Round a monetary/statistical value to 2 decimal places.
///
/// All report figures (averages, percentages, durations) are stored
/// and served with this rounding applied.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
