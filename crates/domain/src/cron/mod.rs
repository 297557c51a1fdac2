//! Five-field cron expressions.
//!
//! `minute hour day-of-month month day-of-week`, each a comma list of `*`,
//! values, `start-end` ranges, optionally suffixed by `/step`. Months and
//! weekdays accept three-letter names; weekday `7` is read as `0` (Sunday),
//! so `5-7` is an inverted range and `0-7` means Sunday only.
//!
//! Day matching follows classic cron: when both day-of-month and
//! day-of-week are restricted, either one matching is enough.

mod field;

pub use field::{CronField, FieldKind};

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Timelike};

/// Why an expression failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CronError {
    #[error("expected 5 fields, found {found}")]
    FieldCount { found: usize },

    #[error("{field} field is empty")]
    EmptyField { field: &'static str },

    #[error("{field} value {value:?} is not a number or known name")]
    InvalidValue { field: &'static str, value: String },

    #[error("{field} value {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{field} range {start}-{end} is inverted")]
    InvertedRange {
        field: &'static str,
        start: u32,
        end: u32,
    },

    #[error("{field} step {step:?} must be a positive integer")]
    InvalidStep { field: &'static str, step: String },
}

/// A parsed cron schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    source: String,
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

impl CronExpression {
    /// Parse a five-field expression.
    ///
    /// # Errors
    ///
    /// Returns [`CronError`] if the field count is wrong or any field is
    /// malformed or out of range.
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, dom, month, dow] = parts.as_slice() else {
            return Err(CronError::FieldCount { found: parts.len() });
        };

        Ok(Self {
            source: parts.join(" "),
            minute: CronField::parse(minute, FieldKind::Minute)?,
            hour: CronField::parse(hour, FieldKind::Hour)?,
            day_of_month: CronField::parse(dom, FieldKind::DayOfMonth)?,
            month: CronField::parse(month, FieldKind::Month)?,
            day_of_week: CronField::parse(dow, FieldKind::DayOfWeek)?,
        })
    }

    /// Whether `at` (already converted to the schedule's local time) falls
    /// on this schedule. Seconds are ignored.
    #[must_use]
    pub fn matches<T: Datelike + Timelike>(&self, at: &T) -> bool {
        if !self.minute.matches(at.minute())
            || !self.hour.matches(at.hour())
            || !self.month.matches(at.month())
        {
            return false;
        }

        let dom_hit = self.day_of_month.matches(at.day());
        let dow_hit = self
            .day_of_week
            .matches(at.weekday().num_days_from_sunday());

        match (
            self.day_of_month.is_wildcard(),
            self.day_of_week.is_wildcard(),
        ) {
            (true, true) => true,
            (true, false) => dow_hit,
            (false, true) => dom_hit,
            (false, false) => dom_hit || dow_hit,
        }
    }

    /// The normalised expression text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Whether `expr` parses as a five-field schedule.
#[must_use]
pub fn is_valid(expr: &str) -> bool {
    CronExpression::parse(expr).is_ok()
}

impl FromStr for CronExpression {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
