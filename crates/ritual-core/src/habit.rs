//! Habit and completion records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::period::Period;

/// A tracked habit.
///
/// `period == None` marks a **draft**: the user has supplied a name but not
/// yet chosen a period. A draft is either promoted (period assigned) or
/// discarded before it is visible anywhere; listing queries exclude drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
  pub habit_id: Uuid,
  pub owner:    i64,
  pub name:     String,
  pub created:  NaiveDate,
  pub period:   Option<Period>,
  pub starred:  bool,
}

impl Habit {
  pub fn is_draft(&self) -> bool { self.period.is_none() }
}

/// A single logged completion of a habit. The streak engine treats "at
/// least one completion in the period" as satisfied, so duplicates within
/// a period change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
  pub habit_id: Uuid,
  pub on:       NaiveDate,
}
