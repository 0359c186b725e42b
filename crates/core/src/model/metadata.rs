use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::{CourseId, TestId};

/// Seconds-based sentinel used on the wire and in display code for "no time limit".
pub const UNLIMITED_SENTINEL: i64 = -1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DurationParseError {
    #[error("duration {raw:?} is not in HH:MM:SS form")]
    Format { raw: String },

    #[error("duration {raw:?} has a minutes or seconds field above 59")]
    OutOfRange { raw: String },
}

/// Time allotted for one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeLimit {
    Unlimited,
    Limited { seconds: u32 },
}

impl TimeLimit {
    /// Parse an optional `HH:MM:SS` duration; `None` means unlimited.
    ///
    /// # Errors
    ///
    /// Returns `DurationParseError` when the string is malformed.
    pub fn from_duration_string(raw: Option<&str>) -> Result<Self, DurationParseError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(TimeLimit::Unlimited),
            Some(value) => value.parse(),
        }
    }

    /// Seconds value, with `-1` standing for unlimited.
    #[must_use]
    pub fn as_sentinel_seconds(self) -> i64 {
        match self {
            TimeLimit::Unlimited => UNLIMITED_SENTINEL,
            TimeLimit::Limited { seconds } => i64::from(seconds),
        }
    }

    #[must_use]
    pub fn seconds(self) -> Option<u32> {
        match self {
            TimeLimit::Unlimited => None,
            TimeLimit::Limited { seconds } => Some(seconds),
        }
    }
}

impl FromStr for TimeLimit {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || DurationParseError::Format { raw: s.to_string() };

        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format_err());
        };

        let field = |value: &str| -> Result<u32, DurationParseError> {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format_err());
            }
            value.parse::<u32>().map_err(|_| format_err())
        };
        let (hours, minutes, seconds) = (field(h)?, field(m)?, field(sec)?);
        if minutes > 59 || seconds > 59 {
            return Err(DurationParseError::OutOfRange { raw: s.to_string() });
        }

        let total = hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .ok_or_else(format_err)?;
        Ok(TimeLimit::Limited { seconds: total })
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::timer::format_remaining(self.as_sentinel_seconds()))
    }
}

/// Descriptive data about a test, fetched before an attempt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMetadata {
    pub test_id: TestId,
    pub course_id: CourseId,
    pub title: String,
    pub time_limit: TimeLimit,
    /// Minimum score (percent) needed to pass, when the test defines one.
    pub passing_score: Option<u32>,
    pub max_attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hh_mm_ss() {
        let limit: TimeLimit = "01:30:05".parse().unwrap();
        assert_eq!(limit, TimeLimit::Limited { seconds: 5405 });
        assert_eq!(limit.as_sentinel_seconds(), 5405);
    }

    #[test]
    fn hours_may_exceed_a_day() {
        let limit: TimeLimit = "25:00:00".parse().unwrap();
        assert_eq!(limit.seconds(), Some(90_000));
    }

    #[test]
    fn missing_duration_is_unlimited() {
        assert_eq!(TimeLimit::from_duration_string(None).unwrap(), TimeLimit::Unlimited);
        assert_eq!(TimeLimit::from_duration_string(Some("  ")).unwrap(), TimeLimit::Unlimited);
        assert_eq!(TimeLimit::Unlimited.as_sentinel_seconds(), -1);
    }

    #[test]
    fn rejects_malformed_strings() {
        for raw in ["10:00", "a:b:c", "1:2:3:4", "-1:00:00", "01::00"] {
            assert!(
                matches!(raw.parse::<TimeLimit>(), Err(DurationParseError::Format { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(matches!(
            "00:60:00".parse::<TimeLimit>(),
            Err(DurationParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn zero_duration_is_limited_zero() {
        assert_eq!(
            "00:00:00".parse::<TimeLimit>().unwrap(),
            TimeLimit::Limited { seconds: 0 }
        );
    }

    #[test]
    fn display_uses_timer_format() {
        assert_eq!(TimeLimit::Limited { seconds: 61 }.to_string(), "00:01:01");
        assert_eq!(TimeLimit::Unlimited.to_string(), "Unlimited");
    }
}
