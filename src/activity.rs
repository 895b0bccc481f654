//! activity.rs
//!
//! Month buckets for the commit-activity chart.
//!
//! A window is N consecutive calendar months ending at the month containing
//! "now", oldest first. All boundaries are computed in UTC. The window is
//! built without looking at the data, so every month gets a bar even when no
//! commit landed in it.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::fmt;

/// A calendar (year, month) pair. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let utc = instant.with_timezone(&Utc);
        Self {
            year: utc.year(),
            month: utc.month(),
        }
    }

    /// The month before this one, borrowing from the year in January.
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Midnight UTC on the first day of the month, `None` when the year is
    /// outside chrono's calendar.
    pub fn start(self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// `months` consecutive keys ending at the month of `now`, oldest first.
pub fn window(now: DateTime<Utc>, months: u32) -> Vec<MonthKey> {
    let mut keys = Vec::with_capacity(months as usize);
    let mut current = MonthKey::of(&now);
    for _ in 0..months {
        keys.push(current);
        current = current.previous();
    }
    keys.reverse();
    keys
}

/// Result of bucketing commits into a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityReport {
    pub window: Vec<MonthKey>,
    /// Same length and order as `window`.
    pub counts: Vec<u64>,
    pub fetched: usize,
    pub counted: u64,
}

impl ActivityReport {
    pub fn labels(&self) -> Vec<String> {
        self.window.iter().map(|k| k.to_string()).collect()
    }
}

/// Counts timestamps per month of `window`.
///
/// `None` entries (commits without a usable author date) are skipped, as are
/// timestamps falling outside the window.
pub fn bucket<I>(window: &[MonthKey], timestamps: I) -> ActivityReport
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    let slots: HashMap<MonthKey, usize> = window.iter().enumerate().map(|(i, k)| (*k, i)).collect();
    let mut counts = vec![0u64; window.len()];
    let mut fetched = 0usize;

    for ts in timestamps {
        fetched += 1;
        let Some(ts) = ts else { continue };
        if let Some(&slot) = slots.get(&MonthKey::of(&ts)) {
            counts[slot] += 1;
        }
    }

    let counted = counts.iter().sum();
    ActivityReport {
        window: window.to_vec(),
        counts,
        fetched,
        counted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn labels(keys: &[MonthKey]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn window_of_three_months() {
        let keys = window(at(2024, 3, 1), 3);
        assert_eq!(labels(&keys), ["2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn window_crosses_year_boundary() {
        let keys = window(at(2024, 2, 29), 4);
        assert_eq!(labels(&keys), ["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn window_is_strictly_increasing_and_ends_now() {
        let now = at(2025, 7, 19);
        for n in [1u32, 2, 12, 13, 25, 120] {
            let keys = window(now, n);
            assert_eq!(keys.len(), n as usize);
            assert!(keys.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(keys.last().unwrap().to_string(), "2025-07");
        }
    }

    #[test]
    fn window_start_is_first_instant_of_oldest_month() {
        let keys = window(at(2024, 3, 17), 12);
        assert_eq!(
            keys[0].start(),
            Some(Utc.with_ymd_and_hms(2023, 4, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn start_is_none_beyond_calendar_range() {
        let keys = window(at(2024, 3, 17), 4_000_000);
        assert!(keys[0].year < -262_143);
        assert_eq!(keys[0].start(), None);
        assert!(keys.last().unwrap().start().is_some());
    }

    #[test]
    fn buckets_match_manual_tally() {
        let keys = window(at(2024, 3, 1), 3);
        let report = bucket(
            &keys,
            [
                Some(at(2024, 1, 15)),
                Some(at(2024, 1, 20)),
                Some(at(2024, 3, 5)),
            ],
        );
        assert_eq!(report.counts, [2, 0, 1]);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.counted, 3);
    }

    #[test]
    fn out_of_window_and_missing_dates_are_dropped() {
        let keys = window(at(2024, 3, 1), 3);
        let report = bucket(
            &keys,
            [
                Some(at(2023, 12, 31)),
                None,
                Some(at(2024, 2, 1)),
                Some(at(2024, 4, 1)),
                None,
            ],
        );
        assert_eq!(report.counts, [0, 1, 0]);
        assert_eq!(report.fetched, 5);
        assert_eq!(report.counted, 1);
    }

    #[test]
    fn counts_align_with_window_when_empty() {
        let keys = window(at(2024, 3, 1), 12);
        let report = bucket(&keys, std::iter::empty());
        assert_eq!(report.counts.len(), 12);
        assert!(report.counts.iter().all(|c| *c == 0));
        assert_eq!(report.labels().len(), 12);
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let keys = window(at(2024, 3, 1), 2);
        // 2024-03-01 01:00 +02:00 is still February in UTC
        let ts = DateTime::parse_from_rfc3339("2024-03-01T01:00:00+02:00")
            .unwrap()
            .with_timezone(&Utc);
        let report = bucket(&keys, [Some(ts)]);
        assert_eq!(report.counts, [1, 0]);
    }

    #[test]
    fn january_borrows_from_previous_year() {
        let jan = MonthKey::of(&at(2024, 1, 31));
        assert_eq!(jan.previous().to_string(), "2023-12");
        assert_eq!(jan.previous().previous().to_string(), "2023-11");
    }
}
