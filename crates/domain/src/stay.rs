//! Half-open stay intervals.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar date format used on the wire (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors produced while building or validating a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    /// Check-out is on or before check-in.
    #[error("Check-out date must be later than check-in date.")]
    NotIncreasing {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// A date string did not match `YYYY-MM-DD`.
    #[error("Invalid date '{value}'. Use YYYY-MM-DD.")]
    Unparseable { value: String },

    /// The stay would run past the representable calendar.
    #[error("Stay of {nights} nights from {check_in} is out of range")]
    OutOfRange { check_in: NaiveDate, nights: u32 },
}

/// A stay `[check_in, check_out)`.
///
/// The range counts nights: a guest checking out on the same day another
/// checks in does not overlap with them. A `DateRange` may hold an invalid
/// pair (check-out not after check-in) so that user input can be represented
/// before it is checked; callers gate on [`DateRange::is_valid`] or
/// [`DateRange::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    /// Creates a range without validating it.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// Creates a range, rejecting zero-night and reversed stays.
    pub fn checked(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DateRangeError> {
        let range = Self::new(check_in, check_out);
        range.validate()?;
        Ok(range)
    }

    /// Builds a stay of `nights` nights starting on `check_in`.
    pub fn from_offset(check_in: NaiveDate, nights: u32) -> Result<Self, DateRangeError> {
        let check_out = check_in
            .checked_add_days(Days::new(u64::from(nights)))
            .ok_or(DateRangeError::OutOfRange { check_in, nights })?;
        Self::checked(check_in, check_out)
    }

    /// Builds a stay starting on the calendar day of `at`, in `at`'s own zone.
    ///
    /// The time-of-day component is dropped before any arithmetic, so a
    /// late-evening timestamp never rolls the stay over to the next day.
    pub fn starting_at<Tz: TimeZone>(at: &DateTime<Tz>, nights: u32) -> Result<Self, DateRangeError> {
        Self::from_offset(at.date_naive(), nights)
    }

    /// Parses `YYYY-MM-DD` check-in and check-out strings into a valid range.
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self, DateRangeError> {
        Self::checked(parse_date(check_in)?, parse_date(check_out)?)
    }

    /// Returns true iff check-in is strictly before check-out.
    pub fn is_valid(&self) -> bool {
        self.check_in < self.check_out
    }

    /// Returns an error describing why the range is invalid, if it is.
    pub fn validate(&self) -> Result<(), DateRangeError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DateRangeError::NotIncreasing {
                check_in: self.check_in,
                check_out: self.check_out,
            })
        }
    }

    /// Returns true if the two stays share at least one night.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Number of nights between check-in and check-out.
    ///
    /// Zero or negative for invalid ranges.
    pub fn nights(&self) -> i64 {
        self.check_out.signed_duration_since(self.check_in).num_days()
    }

    /// Returns true if the stay is still running or upcoming on `day`.
    pub fn ends_after(&self, day: NaiveDate) -> bool {
        self.check_out > day
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.check_in.format(DATE_FORMAT),
            self.check_out.format(DATE_FORMAT)
        )
    }
}

/// Parses a single `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| DateRangeError::Unparseable {
        value: value.to_string(),
    })
}
