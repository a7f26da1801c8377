//! Streak computation over a habit's completion history.
//!
//! All functions are pure: the caller fetches the habit's completion dates
//! once and the backward walk happens in memory, so the math is testable
//! without a store and trivially safe to run concurrently.

use chrono::NaiveDate;

use crate::period::Period;

/// Whether at least one completion falls within the period containing `on`.
///
/// Daily: the same calendar day. Weekly: the same Monday-to-Sunday week.
/// Monthly: the same calendar month. Duplicate completions inside the
/// period are harmless; one is enough.
pub fn is_satisfied(
  period: Period,
  completions: &[NaiveDate],
  on: NaiveDate,
) -> bool {
  let lo = period.start(on);
  let hi = period.next_start(on);
  completions.iter().any(|d| (lo..hi).contains(d))
}

/// Consecutive satisfied periods walking backward from `today`.
///
/// The walk stops at the first unsatisfied period strictly before today's,
/// and when the cursor passes the habit's creation date. Today's own period
/// is exempt: while still open it contributes nothing when unsatisfied but
/// does not break the streak.
pub fn current_streak(
  period: Period,
  created: NaiveDate,
  completions: &[NaiveDate],
  today: NaiveDate,
) -> u32 {
  let mut streak = 0;
  let mut cursor = today;
  while cursor >= created {
    if is_satisfied(period, completions, cursor) {
      streak += 1;
    } else if cursor != today {
      break;
    }
    cursor = period.previous(cursor);
  }
  streak
}

/// The longest run of consecutive satisfied periods anywhere between the
/// habit's creation date and `today`. No exemption for today's period.
pub fn longest_streak(
  period: Period,
  created: NaiveDate,
  completions: &[NaiveDate],
  today: NaiveDate,
) -> u32 {
  let mut run = 0;
  let mut max = 0;
  let mut cursor = today;
  while cursor >= created {
    if is_satisfied(period, completions, cursor) {
      run += 1;
    } else {
      max = max.max(run);
      run = 0;
    }
    cursor = period.previous(cursor);
  }
  // A run ending exactly at the earliest period still counts.
  max.max(run)
}

#[cfg(test)]
mod tests {
  use chrono::Days;

  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  const TODAY: fn() -> NaiveDate = || d(2025, 6, 18); // a Wednesday
  const CREATED: fn() -> NaiveDate = || d(2024, 1, 1);

  fn days_ago(n: u64) -> NaiveDate {
    TODAY() - Days::new(n)
  }

  fn weeks_ago(n: u64) -> NaiveDate {
    TODAY() - Days::new(7 * n)
  }

  fn months_ago(n: u32) -> NaiveDate {
    let mut cursor = Period::Monthly.start(TODAY());
    for _ in 0..n {
      cursor = Period::Monthly.previous(cursor);
    }
    cursor
  }

  // ── is_satisfied ──────────────────────────────────────────────────────

  #[test]
  fn satisfied_daily_requires_same_day() {
    let completions = [days_ago(1)];
    assert!(is_satisfied(Period::Daily, &completions, days_ago(1)));
    assert!(!is_satisfied(Period::Daily, &completions, TODAY()));
  }

  #[test]
  fn satisfied_weekly_spans_monday_to_sunday() {
    // Completion on Wednesday counts for any day of that week.
    let completions = [d(2025, 6, 18)];
    assert!(is_satisfied(Period::Weekly, &completions, d(2025, 6, 16)));
    assert!(is_satisfied(Period::Weekly, &completions, d(2025, 6, 22)));
    assert!(!is_satisfied(Period::Weekly, &completions, d(2025, 6, 23)));
    assert!(!is_satisfied(Period::Weekly, &completions, d(2025, 6, 15)));
  }

  #[test]
  fn satisfied_monthly_spans_calendar_month() {
    let completions = [d(2025, 6, 30)];
    assert!(is_satisfied(Period::Monthly, &completions, d(2025, 6, 1)));
    assert!(!is_satisfied(Period::Monthly, &completions, d(2025, 7, 1)));
    assert!(!is_satisfied(Period::Monthly, &completions, d(2025, 5, 31)));
  }

  #[test]
  fn satisfied_is_monotone_in_completions() {
    let mut completions = vec![days_ago(3)];
    assert!(!is_satisfied(Period::Daily, &completions, TODAY()));
    completions.push(TODAY());
    assert!(is_satisfied(Period::Daily, &completions, TODAY()));
    // Adding more completions never turns a true result false.
    completions.push(TODAY());
    assert!(is_satisfied(Period::Daily, &completions, TODAY()));
  }

  // ── Daily streaks ─────────────────────────────────────────────────────

  #[test]
  fn daily_no_completions_zero_streaks() {
    assert_eq!(current_streak(Period::Daily, CREATED(), &[], TODAY()), 0);
    assert_eq!(longest_streak(Period::Daily, CREATED(), &[], TODAY()), 0);
  }

  #[test]
  fn daily_unbroken_run_counts_back_to_first_gap() {
    let completions: Vec<_> = (1..29).map(days_ago).collect();
    assert_eq!(
      current_streak(Period::Daily, CREATED(), &completions, TODAY()),
      28
    );
  }

  #[test]
  fn daily_gaps_at_seven_and_twentytwo() {
    // Days 1..=28 back from today, minus days 7 and 22.
    let completions: Vec<_> =
      (1..29).filter(|i| *i != 7 && *i != 22).map(days_ago).collect();

    // Today unsatisfied but exempt; days 1-6 satisfied; day 7 breaks.
    assert_eq!(
      current_streak(Period::Daily, CREATED(), &completions, TODAY()),
      6
    );
    // Runs of 6, 14, and 6 — the middle one wins.
    assert_eq!(
      longest_streak(Period::Daily, CREATED(), &completions, TODAY()),
      14
    );
  }

  #[test]
  fn daily_today_completion_extends_current_streak() {
    let completions: Vec<_> = (0..5).map(days_ago).collect();
    assert_eq!(
      current_streak(Period::Daily, CREATED(), &completions, TODAY()),
      5
    );
  }

  #[test]
  fn daily_walk_stops_at_creation_date() {
    // Habit created three days ago, completed every day since.
    let created = days_ago(3);
    let completions: Vec<_> = (0..10).map(days_ago).collect();
    assert_eq!(
      current_streak(Period::Daily, created, &completions, TODAY()),
      4
    );
    assert_eq!(
      longest_streak(Period::Daily, created, &completions, TODAY()),
      4
    );
  }

  // ── Weekly streaks ────────────────────────────────────────────────────

  #[test]
  fn weekly_gap_at_week_two() {
    // Weeks 1, 3, 4 completed; week 2 missing.
    let completions = [weeks_ago(1), weeks_ago(3), weeks_ago(4)];
    assert_eq!(
      current_streak(Period::Weekly, CREATED(), &completions, TODAY()),
      1
    );
  }

  #[test]
  fn weekly_longest_run_behind_the_gap() {
    // Weeks 1, 3, 4, 5 completed; week 2 missing.
    let completions =
      [weeks_ago(1), weeks_ago(3), weeks_ago(4), weeks_ago(5)];
    assert_eq!(
      longest_streak(Period::Weekly, CREATED(), &completions, TODAY()),
      3
    );
  }

  #[test]
  fn weekly_zero_completions() {
    assert_eq!(current_streak(Period::Weekly, CREATED(), &[], TODAY()), 0);
    assert_eq!(longest_streak(Period::Weekly, CREATED(), &[], TODAY()), 0);
  }

  // ── Monthly streaks ───────────────────────────────────────────────────

  #[test]
  fn monthly_four_back_then_gap() {
    // Months 1..=4 back completed; month 5 missing.
    let completions: Vec<_> = (1..5).map(months_ago).collect();
    assert_eq!(
      current_streak(Period::Monthly, CREATED(), &completions, TODAY()),
      4
    );
    assert_eq!(
      longest_streak(Period::Monthly, CREATED(), &completions, TODAY()),
      4
    );
  }

  #[test]
  fn monthly_unbroken_five() {
    let completions: Vec<_> = (1..6).map(months_ago).collect();
    assert_eq!(
      current_streak(Period::Monthly, CREATED(), &completions, TODAY()),
      5
    );
  }

  // ── Current-period exemption ──────────────────────────────────────────

  #[test]
  fn open_period_never_zeroes_a_streak() {
    // Yesterday satisfied, today not yet: the streak survives.
    let completions = [days_ago(1), days_ago(2)];
    assert_eq!(
      current_streak(Period::Daily, CREATED(), &completions, TODAY()),
      2
    );
    // But today's period counts as a break for the longest-streak walk
    // only in the sense that it resets the trailing run.
    assert_eq!(
      longest_streak(Period::Daily, CREATED(), &completions, TODAY()),
      2
    );
  }
}
