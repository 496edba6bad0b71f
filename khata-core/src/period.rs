use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive day range that scopes billing queries.
///
/// Expenses and meal records key on plain dates and are matched with
/// `start..=end`; wallet transactions key on instants and are matched with
/// the half-open `[start_at, end_exclusive_at)` window so late-evening
/// entries on the last day stay inside the period.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self { start, end }
    }

    /// A single-day period.
    pub fn day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// First instant of the period, UTC midnight of `start`.
    pub fn start_at(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the period, UTC midnight of the day after `end`.
    pub fn end_exclusive_at(&self) -> DateTime<Utc> {
        self.end
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_covers_first_to_last_day() {
        let period = Period::month_of(date(2026, 2, 14));
        assert_eq!(period.start, date(2026, 2, 1));
        assert_eq!(period.end, date(2026, 2, 28));
        assert!(period.contains(date(2026, 2, 28)));
        assert!(!period.contains(date(2026, 3, 1)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let period = Period::month_of(date(2025, 12, 31));
        assert_eq!(period.end, date(2025, 12, 31));
        assert_eq!(
            period.end_exclusive_at(),
            date(2026, 1, 1).and_time(NaiveTime::MIN).and_utc()
        );
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let period = Period::new(date(2026, 8, 20), date(2026, 8, 1));
        assert_eq!(period.start, date(2026, 8, 1));
        assert_eq!(period.end, date(2026, 8, 20));
    }
}
