//! Row highlighting by status and end-date proximity.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::record::NormalizedRecord;

/// How far ahead a due date counts as upcoming
pub const DEFAULT_UPCOMING_WEEKS: i64 = 6;

pub const DEFAULT_CLOSED_COLOR: &str = "#9DC184";
pub const DEFAULT_OVERDUE_COLOR: &str = "#D26e69";
pub const DEFAULT_UPCOMING_COLOR: &str = "#FADA76";

/// Highlight category of a row. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCategory {
    Closed,
    Overdue,
    Upcoming,
    Normal,
}

impl RowCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowCategory::Closed => "closed",
            RowCategory::Overdue => "overdue",
            RowCategory::Upcoming => "upcoming",
            RowCategory::Normal => "normal",
        }
    }
}

/// Categorize a row as of `now`.
///
/// Checked in order: a closed row is `Closed` whatever its dates. A row whose
/// end has passed is `Overdue` unless one of its children is closed. A row
/// ending within `window` from now is `Upcoming`. Anything else is `Normal`.
/// End dates count from midnight, so an item due today is already overdue.
/// A window reaching past the calendar's range has no upper limit.
pub fn classify(record: &NormalizedRecord, now: NaiveDateTime, window: Duration) -> RowCategory {
    if record.is_closed() {
        return RowCategory::Closed;
    }
    let Some(end) = record.end_date.map(|d| d.and_time(NaiveTime::MIN)) else {
        return RowCategory::Normal;
    };
    if end < now && !record.has_closed_child() {
        return RowCategory::Overdue;
    }
    let within_window = match now.checked_add_signed(window) {
        Some(horizon) => end < horizon,
        None => true,
    };
    if now < end && within_window {
        return RowCategory::Upcoming;
    }
    RowCategory::Normal
}

/// Background colors per category; `Normal` rows stay unpainted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub closed: String,
    pub overdue: String,
    pub upcoming: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            closed: DEFAULT_CLOSED_COLOR.to_string(),
            overdue: DEFAULT_OVERDUE_COLOR.to_string(),
            upcoming: DEFAULT_UPCOMING_COLOR.to_string(),
        }
    }
}

impl Palette {
    pub fn color_for(&self, category: RowCategory) -> Option<&str> {
        match category {
            RowCategory::Closed => Some(&self.closed),
            RowCategory::Overdue => Some(&self.overdue),
            RowCategory::Upcoming => Some(&self.upcoming),
            RowCategory::Normal => None,
        }
    }
}

/// Classification settings fixed for one render pass
#[derive(Debug, Clone)]
pub struct Classifier {
    pub now: NaiveDateTime,
    pub window: Duration,
    pub palette: Palette,
}

impl Classifier {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            window: Duration::weeks(DEFAULT_UPCOMING_WEEKS),
            palette: Palette::default(),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Category and display color of a row. The caller decides where the
    /// color is stored.
    pub fn resolve(&self, record: &NormalizedRecord) -> (RowCategory, Option<String>) {
        let category = classify(record, self.now, self.window);
        let color = self.palette.color_for(category).map(str::to_string);
        (category, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn row(status: &str, end: NaiveDate) -> NormalizedRecord {
        NormalizedRecord {
            id: 1,
            status: status.to_string(),
            end_date: Some(end),
            ..NormalizedRecord::default()
        }
    }

    fn days(n: i64) -> NaiveDate {
        now().date() + Duration::days(n)
    }

    fn six_weeks() -> Duration {
        Duration::weeks(DEFAULT_UPCOMING_WEEKS)
    }

    #[test]
    fn test_closed_wins_over_dates() {
        for end in [days(-30), days(0), days(7), days(365)] {
            assert_eq!(classify(&row("Closed", end), now(), six_weeks()), RowCategory::Closed);
        }
    }

    #[test]
    fn test_past_end_is_overdue() {
        assert_eq!(classify(&row("Open", days(-1)), now(), six_weeks()), RowCategory::Overdue);
    }

    #[test]
    fn test_due_today_is_overdue_after_midnight() {
        assert_eq!(classify(&row("Open", days(0)), now(), six_weeks()), RowCategory::Overdue);
    }

    #[test]
    fn test_within_window_is_upcoming() {
        assert_eq!(classify(&row("Open", days(7)), now(), six_weeks()), RowCategory::Upcoming);
        assert_eq!(classify(&row("Open", days(41)), now(), six_weeks()), RowCategory::Upcoming);
    }

    #[test]
    fn test_beyond_window_is_normal() {
        assert_eq!(classify(&row("Open", days(43)), now(), six_weeks()), RowCategory::Normal);
        assert_eq!(classify(&row("Open", days(400)), now(), six_weeks()), RowCategory::Normal);
    }

    #[test]
    fn test_missing_end_is_normal() {
        let mut record = row("Open", days(-5));
        record.end_date = None;
        assert_eq!(classify(&record, now(), six_weeks()), RowCategory::Normal);
    }

    #[test]
    fn test_closed_child_suppresses_overdue() {
        let mut record = row("Open", days(-10));
        record.children = Some(vec![row("Closed", days(-12))]);
        assert_eq!(classify(&record, now(), six_weeks()), RowCategory::Normal);
    }

    #[test]
    fn test_open_children_do_not_suppress_overdue() {
        let mut record = row("Open", days(-10));
        record.children = Some(vec![row("Open", days(-12)), row("In progress", days(3))]);
        assert_eq!(classify(&record, now(), six_weeks()), RowCategory::Overdue);

        record.children = Some(vec![]);
        assert_eq!(classify(&record, now(), six_weeks()), RowCategory::Overdue);
    }

    #[test]
    fn test_closed_child_does_not_affect_upcoming() {
        let mut record = row("Open", days(10));
        record.children = Some(vec![row("Closed", days(-2))]);
        assert_eq!(classify(&record, now(), six_weeks()), RowCategory::Upcoming);
    }

    #[test]
    fn test_custom_window() {
        let classifier = Classifier::new(now()).with_window(Duration::weeks(1));
        assert_eq!(classifier.resolve(&row("Open", days(10))).0, RowCategory::Normal);
        assert_eq!(classifier.resolve(&row("Open", days(5))).0, RowCategory::Upcoming);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let classifier = Classifier::new(now()).with_window(Duration::MAX);
        assert_eq!(classifier.resolve(&row("Open", days(4000))).0, RowCategory::Upcoming);
        assert_eq!(classifier.resolve(&row("Open", days(-1))).0, RowCategory::Overdue);
    }

    #[test]
    fn test_resolve_returns_palette_color() {
        let classifier = Classifier::new(now());
        assert_eq!(
            classifier.resolve(&row("Closed", days(1))),
            (RowCategory::Closed, Some(DEFAULT_CLOSED_COLOR.to_string()))
        );
        assert_eq!(
            classifier.resolve(&row("Open", days(-1))),
            (RowCategory::Overdue, Some(DEFAULT_OVERDUE_COLOR.to_string()))
        );
        assert_eq!(
            classifier.resolve(&row("Open", days(3))),
            (RowCategory::Upcoming, Some(DEFAULT_UPCOMING_COLOR.to_string()))
        );
        assert_eq!(classifier.resolve(&row("Open", days(300))), (RowCategory::Normal, None));
    }

    #[test]
    fn test_resolve_is_pure() {
        let classifier = Classifier::new(now());
        let record = row("Open", days(-1));
        let _ = classifier.resolve(&record);
        assert!(record.row_color.is_none());
    }
}
