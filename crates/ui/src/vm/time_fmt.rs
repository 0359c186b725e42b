use chrono::{DateTime, Utc};

use assess_core::timer::format_remaining;

/// Countdown label for the attempt header.
#[must_use]
pub fn timer_label(remaining_seconds: Option<i64>) -> String {
    match remaining_seconds {
        None => "--:--:--".to_string(),
        Some(seconds) => format_remaining(seconds),
    }
}

/// Whether the countdown should be highlighted (last minute of a limited attempt).
#[must_use]
pub fn timer_is_urgent(remaining_seconds: Option<i64>) -> bool {
    matches!(remaining_seconds, Some(seconds) if (0..=60).contains(&seconds))
}

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::time::fixed_now;

    #[test]
    fn labels_cover_loading_unlimited_and_running() {
        assert_eq!(timer_label(None), "--:--:--");
        assert_eq!(timer_label(Some(-1)), "Unlimited");
        assert_eq!(timer_label(Some(3_725)), "01:02:05");
    }

    #[test]
    fn only_the_last_minute_is_urgent() {
        assert!(!timer_is_urgent(Some(-1)));
        assert!(!timer_is_urgent(Some(61)));
        assert!(timer_is_urgent(Some(60)));
        assert!(timer_is_urgent(Some(0)));
        assert!(!timer_is_urgent(None));
    }

    #[test]
    fn datetime_is_minute_precision() {
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13 UTC");
    }
}
