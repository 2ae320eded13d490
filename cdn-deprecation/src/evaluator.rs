//! Evaluator - Decide whether a deprecation date has been reached
//!
//! A threshold is a calendar date with no time of day. It is read as the start
//! of that day in the reference timezone, and "now" is judged in two frames:
//!
//! - the reference frame: has the instant passed midnight of the date in the
//!   reference timezone?
//! - the caller's frame: does the caller's local wall clock already read the
//!   date (or later)?
//!
//! The date counts as passed if either frame says so. Both comparisons are
//! inclusive, so midnight itself is already passed.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::timezone;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

/// Errors from parsing a threshold date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Not in YYYY-MM-DD form
    #[error("'{0}' is not a YYYY-MM-DD date")]
    Format(String),

    /// Well-formed but not a real calendar day (e.g. 2025-13-40)
    #[error("'{0}' is not a valid calendar date")]
    OutOfRange(String),
}

/// Parse a `YYYY-MM-DD` threshold date
pub fn parse_threshold(date: &str) -> Result<NaiveDate, DateError> {
    if !DATE_PATTERN.is_match(date) {
        return Err(DateError::Format(date.to_string()));
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DateError::OutOfRange(date.to_string()))
}

/// Evaluates threshold dates against a reference timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    reference: Tz,
}

impl Evaluator {
    pub fn new(reference: Tz) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> Tz {
        self.reference
    }

    /// Has `date` passed, by the system clock and the system's local timezone?
    pub fn is_date_passed(&self, date: &str) -> bool {
        self.is_date_passed_with(date, &SystemClock)
    }

    /// Has `date` passed, according to `clock`?
    pub fn is_date_passed_with(&self, date: &str, clock: &impl Clock) -> bool {
        let now = clock.now();
        self.is_date_passed_at(date, now, &clock.local_offset(now))
    }

    /// Has `date` passed at instant `now`, for a caller located in `local`?
    ///
    /// Malformed dates never pass.
    pub fn is_date_passed_at<L: TimeZone>(
        &self,
        date: &str,
        now: DateTime<Utc>,
        local: &L,
    ) -> bool {
        match parse_threshold(date) {
            Ok(threshold) => self.has_passed(threshold, now, local),
            Err(e) => {
                log::warn!("Ignoring deprecation threshold: {}", e);
                false
            }
        }
    }

    /// Same as [`Evaluator::is_date_passed_at`] for an already parsed date
    pub fn has_passed<L: TimeZone>(
        &self,
        threshold: NaiveDate,
        now: DateTime<Utc>,
        local: &L,
    ) -> bool {
        let midnight = threshold.and_time(NaiveTime::MIN);

        let reference_threshold = start_of_day(&self.reference, midnight);
        let reference_now = now.with_timezone(&self.reference);
        let reference_passed = reference_now >= reference_threshold;

        let local_now = now.with_timezone(local).naive_local();
        let local_passed = local_now >= midnight;

        log::debug!(
            "threshold {}: reference now {} (passed: {}), local now {} (passed: {})",
            threshold,
            reference_now,
            reference_passed,
            local_now,
            local_passed
        );

        reference_passed || local_passed
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(timezone::reference())
    }
}

/// Has `date` passed? Uses America/Los_Angeles as reference (UTC if unavailable)
/// and the system clock.
pub fn is_date_passed(date: &str) -> bool {
    Evaluator::default().is_date_passed(date)
}

/// First instant of the local day starting at `midnight` in `tz`.
///
/// If midnight falls into a DST gap the day starts an hour later; if it is
/// ambiguous the earlier instant wins.
fn start_of_day(tz: &Tz, midnight: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}
