//! Reading-speed arithmetic.

use std::time::Duration;

/// Time between two words at `wpm`.
pub fn tick_interval(wpm: u32) -> Duration {
    Duration::from_secs(60) / wpm.max(1)
}

/// Time needed to read `words` words at `wpm`.
pub fn reading_time(words: usize, wpm: u32) -> Duration {
    Duration::from_secs_f64(words as f64 * 60.0 / f64::from(wpm.max(1)))
}

/// Format a duration as `m:ss`. Fractions of a second are dropped.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval() {
        assert_eq!(tick_interval(300), Duration::from_millis(200));
        assert_eq!(tick_interval(100), Duration::from_millis(600));
        assert_eq!(tick_interval(1200), Duration::from_millis(50));
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(300, 300), Duration::from_secs(60));
        assert_eq!(reading_time(0, 300), Duration::ZERO);
        assert_eq!(reading_time(150, 600), Duration::from_secs(15));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::ZERO), "0:00");
        assert_eq!(format_clock(Duration::from_secs(65)), "1:05");
        assert_eq!(format_clock(Duration::from_millis(59_999)), "0:59");
        assert_eq!(format_clock(Duration::from_secs(3600)), "60:00");
    }
}
