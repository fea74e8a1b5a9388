//! Calendar-date helpers.
//!
//! Every value here is a naive calendar date. A `YYYY-MM-DD` string is never
//! interpreted as an instant, so no local UTC offset can move it to the
//! neighbouring day.

use std::cmp::Ordering;

use chrono::{Datelike, Local, NaiveDate, TimeDelta};

use crate::{Error, Result};

const WIRE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict, zero-padded `YYYY-MM-DD` string.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  let s = s.trim();
  let bytes = s.as_bytes();
  let shaped = bytes.len() == 10
    && bytes.iter().enumerate().all(|(i, b)| match i {
      4 | 7 => *b == b'-',
      _ => b.is_ascii_digit(),
    });
  if !shaped {
    return Err(Error::InvalidDate(s.to_owned()));
  }
  NaiveDate::parse_from_str(s, WIRE_FORMAT)
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// Year, then month, then day.
pub fn compare_dates(a: NaiveDate, b: NaiveDate) -> Ordering {
  (a.year(), a.month(), a.day()).cmp(&(b.year(), b.month(), b.day()))
}

/// `start <= date <= end`.
pub fn is_within_inclusive(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
  date >= start && date <= end
}

/// Whether two inclusive ranges share at least one day. Ranges that touch on
/// a single day overlap.
pub fn ranges_overlap(
  start_a: NaiveDate,
  end_a: NaiveDate,
  start_b: NaiveDate,
  end_b: NaiveDate,
) -> bool {
  start_a <= end_b && end_a >= start_b
}

/// Number of calendar days from `start` to `end`, both included.
///
/// Computed from day ordinals, so DST transitions cannot skew it. A reversed
/// range yields zero or a negative count.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
  i64::from(end.num_days_from_ce()) - i64::from(start.num_days_from_ce()) + 1
}

/// Shift `date` by `days` calendar days, rolling over months and years.
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
  TimeDelta::try_days(days)
    .and_then(|delta| date.checked_add_signed(delta))
    .ok_or(Error::DateOutOfRange)
}

/// The current calendar date in the local timezone.
pub fn today() -> NaiveDate { Local::now().date_naive() }

/// `dd/mm/yyyy`, the display form used in user-facing messages.
pub fn format_date_br(date: NaiveDate) -> String {
  date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate { parse_date(s).unwrap() }

  #[test]
  fn parses_only_zero_padded_dates() {
    assert_eq!(d("2026-01-05"), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    assert!(matches!(parse_date("2026-1-5"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date("2026-02-30"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date("2026-01-05T00:00:00Z"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date(""), Err(Error::InvalidDate(_))));
  }

  #[test]
  fn compare_orders_by_calendar() {
    assert_eq!(compare_dates(d("2025-12-31"), d("2026-01-01")), Ordering::Less);
    assert_eq!(compare_dates(d("2026-03-01"), d("2026-03-01")), Ordering::Equal);
    assert_eq!(compare_dates(d("2026-03-02"), d("2026-02-28")), Ordering::Greater);
  }

  #[test]
  fn within_is_inclusive_on_both_ends() {
    let (start, end) = (d("2026-01-01"), d("2026-01-31"));
    assert!(is_within_inclusive(start, start, end));
    assert!(is_within_inclusive(end, start, end));
    assert!(is_within_inclusive(d("2026-01-15"), start, end));
    assert!(!is_within_inclusive(d("2025-12-31"), start, end));
    assert!(!is_within_inclusive(d("2026-02-01"), start, end));
  }

  #[test]
  fn touching_ranges_overlap() {
    assert!(ranges_overlap(
      d("2026-01-01"),
      d("2026-01-10"),
      d("2026-01-10"),
      d("2026-01-20"),
    ));
    assert!(!ranges_overlap(
      d("2026-01-01"),
      d("2026-01-09"),
      d("2026-01-10"),
      d("2026-01-20"),
    ));
  }

  #[test]
  fn overlap_is_symmetric() {
    let days = ["2026-01-01", "2026-01-05", "2026-01-10", "2026-02-01"].map(d);
    for &a1 in &days {
      for &a2 in days.iter().filter(|x| **x >= a1) {
        for &b1 in &days {
          for &b2 in days.iter().filter(|x| **x >= b1) {
            assert_eq!(
              ranges_overlap(a1, a2, b1, b2),
              ranges_overlap(b1, b2, a1, a2),
            );
          }
        }
      }
    }
  }

  #[test]
  fn day_count_is_inclusive() {
    assert_eq!(inclusive_day_count(d("2026-01-01"), d("2026-01-01")), 1);
    assert_eq!(inclusive_day_count(d("2026-01-01"), d("2026-01-10")), 10);
    assert_eq!(inclusive_day_count(d("2024-02-28"), d("2024-03-01")), 3);
    assert_eq!(inclusive_day_count(d("2025-12-31"), d("2026-01-01")), 2);
  }

  #[test]
  fn day_count_ignores_dst_transitions() {
    // Brazil, US and EU transition weekends.
    assert_eq!(inclusive_day_count(d("2018-11-03"), d("2018-11-05")), 3);
    assert_eq!(inclusive_day_count(d("2026-03-07"), d("2026-03-09")), 3);
    assert_eq!(inclusive_day_count(d("2026-03-28"), d("2026-03-30")), 3);
  }

  #[test]
  fn day_count_is_shift_invariant() {
    let (start, end) = (d("2026-01-20"), d("2026-03-05"));
    let base = inclusive_day_count(start, end);
    for k in [-800, -31, -1, 0, 1, 29, 365, 1461] {
      let shifted =
        inclusive_day_count(add_days(start, k).unwrap(), add_days(end, k).unwrap());
      assert_eq!(shifted, base, "shift by {k}");
    }
  }

  #[test]
  fn add_days_rolls_over() {
    assert_eq!(add_days(d("2026-01-31"), 1).unwrap(), d("2026-02-01"));
    assert_eq!(add_days(d("2026-12-31"), 1).unwrap(), d("2027-01-01"));
    assert_eq!(add_days(d("2024-03-01"), -1).unwrap(), d("2024-02-29"));
    assert_eq!(add_days(d("2026-01-10"), -10).unwrap(), d("2025-12-31"));
    assert!(matches!(add_days(d("2026-01-01"), i64::MAX), Err(Error::DateOutOfRange)));
  }

  #[test]
  fn formats_day_first() {
    assert_eq!(format_date_br(d("2026-01-05")), "05/01/2026");
  }
}
