//! Historical date window validation
//!
//! A run starts from an operator-supplied `YYYY-MM-DD` date and always ends at
//! the moment of validation. The end is recomputed on every call and never
//! persisted.

use crate::error::DateError;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Expected format of the start date argument
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated, inclusive window of time to backdate commits into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl DateRange {
    /// Build a range from explicit bounds, `None` when `start > end`
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Validate a raw start date against the current wall clock
    pub fn validate(raw_start: &str) -> Result<Self, DateError> {
        Self::validate_at(raw_start, Local::now().fixed_offset())
    }

    /// Validate a raw start date against an explicit "now"
    ///
    /// The start is midnight of the parsed date, in the same UTC offset as `now`.
    pub fn validate_at(raw_start: &str, now: DateTime<FixedOffset>) -> Result<Self, DateError> {
        let invalid = || DateError::InvalidFormat {
            input: raw_start.to_string(),
        };

        let date = NaiveDate::parse_from_str(raw_start.trim(), DATE_FORMAT).map_err(|_| invalid())?;
        let start = date
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(*now.offset()).single())
            .ok_or_else(invalid)?;

        if start > now {
            return Err(DateError::FutureStart {
                input: raw_start.to_string(),
            });
        }

        tracing::debug!("Validated date range {} .. {}", start, now);
        Ok(Self { start, end: now })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// Whole days between start and end, rounded down
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether `t` lies inside the inclusive window
    pub fn contains(&self, t: DateTime<FixedOffset>) -> bool {
        self.start <= t && t <= self.end
    }
}
