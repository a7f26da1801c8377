//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 (`YYYY-MM-DD`) strings, UUIDs as
//! hyphenated lowercase strings, and periods as their display labels.

use chrono::NaiveDate;
use ritual_core::{habit::Habit, period::Period, user::User};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Period ──────────────────────────────────────────────────────────────────

pub fn encode_period(p: Period) -> &'static str { p.as_str() }

pub fn decode_period(s: &str) -> Result<Period> {
  Ok(s.parse::<Period>()?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:        i64,
  pub username:       Option<String>,
  pub created:        String,
  pub screen:         String,
  pub disposable_msg: Option<i64>,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:        self.user_id,
      username:       self.username,
      created:        decode_date(&self.created)?,
      screen:         self.screen,
      disposable_msg: self.disposable_msg,
    })
  }
}

/// Raw strings read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id: String,
  pub owner:    i64,
  pub name:     String,
  pub created:  String,
  pub period:   Option<String>,
  pub starred:  bool,
}

impl RawHabit {
  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      habit_id: decode_uuid(&self.habit_id)?,
      owner:    self.owner,
      name:     self.name,
      created:  decode_date(&self.created)?,
      period:   self.period.as_deref().map(decode_period).transpose()?,
      starred:  self.starred,
    })
  }
}
