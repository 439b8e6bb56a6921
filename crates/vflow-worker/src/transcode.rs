//! Simulated transcode step.
//!
//! No real codec work happens here. The step sleeps for a configured
//! interval to model transcode latency and derives a duration estimate
//! from the source size.

use std::time::Duration;

/// Assumed average bitrate of uploaded sources, bits per second.
const ASSUMED_BITRATE_BPS: f64 = 1_500_000.0;

/// Estimate playback duration from the object size, assuming a fixed
/// average bitrate. Always at least one second for non-trivial files.
pub fn estimate_duration_seconds(size_bytes: u64) -> f64 {
    if size_bytes == 0 {
        return 0.0;
    }
    (size_bytes as f64 * 8.0 / ASSUMED_BITRATE_BPS).max(1.0)
}

/// Sleep for the configured simulated transcode time.
pub async fn simulate(delay: Duration) {
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_has_zero_duration() {
        assert_eq!(estimate_duration_seconds(0), 0.0);
    }

    #[test]
    fn tiny_file_floors_at_one_second() {
        assert_eq!(estimate_duration_seconds(100), 1.0);
    }

    #[test]
    fn duration_scales_with_size() {
        // 1.5 Mbit/s means 187_500 bytes per second of video.
        let one_minute = 187_500 * 60;
        let estimate = estimate_duration_seconds(one_minute);
        assert!((estimate - 60.0).abs() < 0.01);
    }
}
