//! Compact poll durations such as `1d2h3m4s`
//!
//! Every segment is optional, but segments must appear in day, hour,
//! minute, second order. Matching is case-insensitive, so `10H30M` equals
//! `10h30m`.
//!
//! Parsing and validity are separate questions: `""` and `"0s"` both parse
//! to a zero-length [`DurationSpec`], which callers reject with
//! [`DurationSpec::is_zero`]. Input that does not fit the pattern at all
//! (`"soon"`, `"5x"`, `"3s2m"`) fails to parse.
//!
//! ```
//! use pollbot_domain::DurationSpec;
//!
//! let spec = DurationSpec::parse("1d2h3m4s").unwrap();
//! assert_eq!(spec.total_seconds(), Some(93_784));
//!
//! assert!(DurationSpec::parse("0s").unwrap().is_zero());
//! assert!(DurationSpec::parse("soon").is_none());
//! ```

use chrono::TimeDelta;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<days>\d+)d)?(?:(?P<hours>\d+)h)?(?:(?P<minutes>\d+)m)?(?:(?P<seconds>\d+)s)?$",
    )
    .expect("duration pattern is a valid regex")
});

/// Days, hours, minutes and seconds extracted from a duration string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSpec {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationSpec {
    /// Parse a duration string.
    ///
    /// Returns `None` when the input doesn't match the segment pattern or a
    /// segment overflows. Absent segments default to zero.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_lowercase();
        let captures = DURATION_PATTERN.captures(&lowered)?;

        let segment = |name: &str| -> Option<u64> {
            match captures.name(name) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(0),
            }
        };

        Some(Self {
            days: segment("days")?,
            hours: segment("hours")?,
            minutes: segment("minutes")?,
            seconds: segment("seconds")?,
        })
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.total_seconds() == Some(0)
    }

    /// Total length in seconds, `None` on overflow.
    pub fn total_seconds(&self) -> Option<u64> {
        self.days
            .checked_mul(86_400)?
            .checked_add(self.hours.checked_mul(3_600)?)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)
    }

    /// Convert to a chrono span, `None` if it does not fit.
    pub fn to_time_delta(&self) -> Option<TimeDelta> {
        let secs = i64::try_from(self.total_seconds()?).ok()?;
        TimeDelta::try_seconds(secs)
    }
}

impl std::fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.days > 0 {
            write!(f, "{}d", self.days)?;
        }
        if self.hours > 0 {
            write!(f, "{}h", self.hours)?;
        }
        if self.minutes > 0 {
            write!(f, "{}m", self.minutes)?;
        }
        if self.seconds > 0 || self.is_zero() {
            write!(f, "{}s", self.seconds)?;
        }
        Ok(())
    }
}
