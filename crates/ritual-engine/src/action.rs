//! The closed set of dispatcher actions.
//!
//! The dialogue graph and callback payloads reference actions by their wire
//! name; this enum is the full registry. A name outside the set is a
//! configuration error, surfaced at startup validation or first use rather
//! than silently ignored.

use std::str::FromStr;

use ritual_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  /// Transition-only bootstrap: enter `start`, then `main`.
  Start,
  /// Delete the user's pending draft habit.
  DiscardDraft,
  /// Send the habit-list panel, or refresh it in place (arg `y`).
  ShowHabits,
  /// Consume the typed text as a new habit's name; advance to period
  /// selection.
  NameHabit,
  /// Consume the typed text as the period; promote the draft and return
  /// to `main`.
  SetPeriod,
  /// Habit detail panel (arg: habit id).
  Info,
  /// Log a completion for the current period (arg: habit id).
  Complete,
  /// Toggle the starred flag (arg: habit id).
  Star,
  /// Delete a habit and all its completions (arg: habit id).
  Delete,
  /// Aggregate statistics across the user's habits.
  Stats,
  /// Delete the recorded disposable panel message.
  PurgeMessage,
  /// Seed demo habits with a year of history for the user.
  Fixture,
}

impl Action {
  /// The wire name used in graph configuration and callback payloads.
  /// Must round-trip through [`FromStr`].
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Start => "start",
      Self::DiscardDraft => "discard_draft",
      Self::ShowHabits => "show_habits",
      Self::NameHabit => "name_habit",
      Self::SetPeriod => "set_period",
      Self::Info => "info",
      Self::Complete => "complete",
      Self::Star => "star",
      Self::Delete => "delete",
      Self::Stats => "stats",
      Self::PurgeMessage => "purge_message",
      Self::Fixture => "fixture",
    }
  }
}

impl FromStr for Action {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "start" => Ok(Self::Start),
      "discard_draft" => Ok(Self::DiscardDraft),
      "show_habits" => Ok(Self::ShowHabits),
      "name_habit" => Ok(Self::NameHabit),
      "set_period" => Ok(Self::SetPeriod),
      "info" => Ok(Self::Info),
      "complete" => Ok(Self::Complete),
      "star" => Ok(Self::Star),
      "delete" => Ok(Self::Delete),
      "stats" => Ok(Self::Stats),
      "purge_message" => Ok(Self::PurgeMessage),
      "fixture" => Ok(Self::Fixture),
      other => Err(Error::UnknownAction(other.to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_names_round_trip() {
    let all = [
      Action::Start,
      Action::DiscardDraft,
      Action::ShowHabits,
      Action::NameHabit,
      Action::SetPeriod,
      Action::Info,
      Action::Complete,
      Action::Star,
      Action::Delete,
      Action::Stats,
      Action::PurgeMessage,
      Action::Fixture,
    ];
    for action in all {
      assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
    }
  }

  #[test]
  fn unknown_name_is_an_error() {
    assert!(matches!(
      "frobnicate".parse::<Action>(),
      Err(Error::UnknownAction(_))
    ));
  }
}
