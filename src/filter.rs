//! Range filters over table rows.
//!
//! Every filter takes an [`Interval`] whose bounds arrive as free text from an
//! editor (or the command line). An empty bound leaves that side open. The
//! predicates never fail: a bound or value that cannot be parsed is logged and
//! the row is excluded.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::parse_iso_date;
use crate::record::NormalizedRecord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("invalid range '{0}': expected START..END (either side may be empty)")]
    Syntax(String),
    #[error("invalid {which} bound '{value}': expected {expected}")]
    Bound {
        which: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// A `{start, end}` pair as committed by a range editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Interval {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

impl Interval {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// January 1st through December 31st of `year`
    pub fn calendar_year(year: i32) -> Self {
        Self::new(format!("{:04}-01-01", year), format!("{:04}-12-31", year))
    }

    /// Reject bounds that are not ISO dates
    pub fn check_dates(&self) -> Result<(), IntervalError> {
        self.check_bounds("an ISO date (YYYY-MM-DD)", |s| parse_iso_date(s).is_some())
    }

    /// Reject bounds that are not numbers
    pub fn check_numbers(&self) -> Result<(), IntervalError> {
        self.check_bounds("a number", |s| parse_number(s).is_some())
    }

    fn check_bounds(
        &self,
        expected: &'static str,
        valid: impl Fn(&str) -> bool,
    ) -> Result<(), IntervalError> {
        for (which, value) in [("start", &self.start), ("end", &self.end)] {
            if !value.trim().is_empty() && !valid(value) {
                return Err(IntervalError::Bound {
                    which,
                    value: value.clone(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    /// Parse `START..END`, `START..`, `..END` or `..`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..")
            .ok_or_else(|| IntervalError::Syntax(s.to_string()))?;
        Ok(Interval::new(start.trim(), end.trim()))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

enum Bound<T> {
    Open,
    At(T),
    Invalid,
}

fn bound<T>(text: &str, parse: impl Fn(&str) -> Option<T>) -> Bound<T> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Bound::Open;
    }
    match parse(trimmed) {
        Some(value) => Bound::At(value),
        None => Bound::Invalid,
    }
}

/// `Some(inside)` when both bounds parsed, `None` if either is invalid
fn within<T: PartialOrd>(value: &T, lower: Bound<T>, upper: Bound<T>) -> Option<bool> {
    let above = match lower {
        Bound::Open => true,
        Bound::At(ref lo) => value >= lo,
        Bound::Invalid => return None,
    };
    let below = match upper {
        Bound::Open => true,
        Bound::At(ref hi) => value <= hi,
        Bound::Invalid => return None,
    };
    Some(above && below)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Min/max filter over a numeric column such as progress.
///
/// An absent, zero or NaN value always passes: a row with no recorded
/// progress is never hidden by a progress filter.
pub fn passes_numeric(interval: &Interval, value: Option<f64>) -> bool {
    let Some(value) = value.filter(|v| *v != 0.0 && !v.is_nan()) else {
        return true;
    };
    let lower = bound(&interval.start, parse_number);
    let upper = bound(&interval.end, parse_number);
    match within(&value, lower, upper) {
        Some(inside) => inside,
        None => {
            tracing::warn!(%interval, "ignoring row: numeric range bound is not a number");
            false
        }
    }
}

/// Inclusive date-range filter over a textual ISO date
pub fn passes_date(interval: &Interval, value: &str) -> bool {
    match parse_iso_date(value) {
        Some(date) => passes_date_value(interval, Some(date)),
        None => {
            tracing::warn!(%interval, value, "ignoring row: date is not an ISO date");
            false
        }
    }
}

/// Inclusive date-range filter over an already parsed date.
///
/// A missing date is treated like an unparseable one and excluded.
pub fn passes_date_value(interval: &Interval, value: Option<NaiveDate>) -> bool {
    let Some(value) = value else {
        tracing::debug!(%interval, "ignoring row without a date");
        return false;
    };
    let lower = bound(&interval.start, parse_iso_date);
    let upper = bound(&interval.end, parse_iso_date);
    match within(&value, lower, upper) {
        Some(inside) => inside,
        None => {
            tracing::warn!(%interval, "ignoring row: date range bound is not an ISO date");
            false
        }
    }
}

/// Date-range filter on the end date that also accepts a row when any
/// descendant's end date is in range, so a parent never disappears while one
/// of its children qualifies.
pub fn passes_date_tree(interval: &Interval, record: &NormalizedRecord) -> bool {
    passes_date_value(interval, record.end_date)
        || record.any_descendant(&|child| passes_date_value(interval, child.end_date))
}

/// The set of filters active on a table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowFilter {
    /// Range over the finish date
    pub end_range: Option<Interval>,
    /// Range over the progress percentage
    pub progress: Option<Interval>,
    /// Rows with one of these statuses are hidden
    pub excluded_statuses: Vec<String>,
    /// Also accept rows kept alive by an accepted descendant in date range
    pub descendants: bool,
}

impl RowFilter {
    /// Whether a row passes every active filter.
    ///
    /// In descendant mode a row outside the date range is still accepted when
    /// one of its children is accepted, so it never survives on the strength
    /// of a descendant that is itself filtered out.
    pub fn accepts(&self, record: &NormalizedRecord) -> bool {
        if !self.accepts_own_fields(record) {
            return false;
        }
        match &self.end_range {
            None => true,
            Some(range) if self.descendants => {
                passes_date_value(range, record.end_date)
                    || record.child_rows().iter().any(|child| self.accepts(child))
            }
            Some(range) => passes_date_value(range, record.end_date),
        }
    }

    /// Status and progress checks, which never look below the row
    fn accepts_own_fields(&self, record: &NormalizedRecord) -> bool {
        if self.excluded_statuses.iter().any(|s| *s == record.status) {
            return false;
        }
        if let Some(progress) = &self.progress
            && !passes_numeric(progress, record.progress)
        {
            return false;
        }
        true
    }

    /// Drop rejected rows at every level of the tree
    pub fn apply(&self, records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
        records
            .into_iter()
            .filter(|record| self.accepts(record))
            .map(|mut record| {
                record.children = record.children.take().map(|c| self.apply(c));
                record
            })
            .collect()
    }
}
