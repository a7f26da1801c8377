//! Calendar-period arithmetic for habit evaluation.
//!
//! A period is a calendar bucket (day, week, or month) against which habit
//! completion is judged. Every function operates on a single logical
//! [`NaiveDate`] per call; there is no timezone model.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The granularity at which a habit is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
  Daily,
  Weekly,
  Monthly,
}

impl Period {
  /// The label shown on the period-selection screen and stored in the
  /// database. Must round-trip through [`FromStr`](std::str::FromStr).
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Daily => "Daily",
      Self::Weekly => "Weekly",
      Self::Monthly => "Monthly",
    }
  }

  /// The first day of the period containing `d`.
  ///
  /// Daily: `d` itself. Weekly: the Monday of `d`'s week. Monthly: the
  /// first day of `d`'s month.
  pub fn start(self, d: NaiveDate) -> NaiveDate {
    match self {
      Self::Daily => d,
      Self::Weekly => {
        d - Days::new(u64::from(d.weekday().num_days_from_monday()))
      }
      Self::Monthly => d - Days::new(u64::from(d.day0())),
    }
  }

  /// The first day of the period after the one containing `d`.
  pub fn next_start(self, d: NaiveDate) -> NaiveDate {
    match self {
      Self::Daily => d + Days::new(1),
      Self::Weekly => self.start(d) + Days::new(7),
      Self::Monthly => {
        // Stepping one day back from the start and forward 32 days lands
        // inside the next month for every month length.
        let start = self.start(d);
        self.start(start + Days::new(32))
      }
    }
  }

  /// The start of the period immediately before the one containing `d`.
  ///
  /// The result is always a period start, so repeated application walks
  /// backward period by period from any date.
  pub fn previous(self, d: NaiveDate) -> NaiveDate {
    match self {
      Self::Daily => d - Days::new(1),
      Self::Weekly => self.start(d) - Days::new(7),
      Self::Monthly => self.start(self.start(d) - Days::new(1)),
    }
  }
}

impl std::str::FromStr for Period {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "Daily" => Ok(Self::Daily),
      "Weekly" => Ok(Self::Weekly),
      "Monthly" => Ok(Self::Monthly),
      other => Err(Error::UnknownPeriod(other.to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[test]
  fn daily_start_is_identity() {
    assert_eq!(Period::Daily.start(d(2025, 6, 18)), d(2025, 6, 18));
  }

  #[test]
  fn weekly_start_is_monday() {
    // 2025-06-18 is a Wednesday.
    assert_eq!(Period::Weekly.start(d(2025, 6, 18)), d(2025, 6, 16));
    // A Monday maps to itself.
    assert_eq!(Period::Weekly.start(d(2025, 6, 16)), d(2025, 6, 16));
    // A Sunday maps back to the preceding Monday.
    assert_eq!(Period::Weekly.start(d(2025, 6, 22)), d(2025, 6, 16));
  }

  #[test]
  fn monthly_start_is_first_of_month() {
    assert_eq!(Period::Monthly.start(d(2025, 6, 18)), d(2025, 6, 1));
    assert_eq!(Period::Monthly.start(d(2024, 2, 29)), d(2024, 2, 1));
  }

  #[test]
  fn next_start_spans_period_end() {
    assert_eq!(Period::Daily.next_start(d(2025, 6, 18)), d(2025, 6, 19));
    assert_eq!(Period::Weekly.next_start(d(2025, 6, 18)), d(2025, 6, 23));
    assert_eq!(Period::Monthly.next_start(d(2025, 6, 18)), d(2025, 7, 1));
    // Month lengths: 31-day, 28-day, leap February.
    assert_eq!(Period::Monthly.next_start(d(2025, 1, 31)), d(2025, 2, 1));
    assert_eq!(Period::Monthly.next_start(d(2025, 2, 14)), d(2025, 3, 1));
    assert_eq!(Period::Monthly.next_start(d(2024, 2, 29)), d(2024, 3, 1));
    assert_eq!(Period::Monthly.next_start(d(2025, 12, 31)), d(2026, 1, 1));
  }

  #[test]
  fn previous_walks_period_starts() {
    assert_eq!(Period::Daily.previous(d(2025, 6, 18)), d(2025, 6, 17));
    // From mid-week to the prior Monday.
    assert_eq!(Period::Weekly.previous(d(2025, 6, 18)), d(2025, 6, 9));
    // From mid-month to the prior first-of-month.
    assert_eq!(Period::Monthly.previous(d(2025, 6, 18)), d(2025, 5, 1));
  }

  #[test]
  fn previous_crosses_year_boundary() {
    assert_eq!(Period::Daily.previous(d(2025, 1, 1)), d(2024, 12, 31));
    assert_eq!(Period::Weekly.previous(d(2025, 1, 1)), d(2024, 12, 23));
    assert_eq!(Period::Monthly.previous(d(2025, 1, 15)), d(2024, 12, 1));
  }

  #[test]
  fn period_label_round_trips() {
    for p in [Period::Daily, Period::Weekly, Period::Monthly] {
      assert_eq!(p.as_str().parse::<Period>().unwrap(), p);
    }
    assert!("Hourly".parse::<Period>().is_err());
  }
}
