/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns true when `timestamp_ms` falls inside the trailing window ending
/// at `now_ms`. Timestamps in the future relative to `now_ms` count as inside.
pub fn is_within_window_ms(timestamp_ms: u64, now_ms: u64, window_ms: u64) -> bool {
    timestamp_ms >= now_ms.saturating_sub(window_ms)
}
