//! Error types for `ritual-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A user's stored screen (or a choice target) names a screen that does
  /// not exist — a configuration-integrity error, fatal for the event.
  #[error("screen not found: {0:?}")]
  ScreenNotFound(String),

  #[error("user not found: {0}")]
  UserNotFound(i64),

  /// The habit id does not exist or does not belong to the requesting
  /// owner.
  #[error("habit not found: {0}")]
  HabitNotFound(Uuid),

  /// Graph configuration referenced an action name the registry does not
  /// implement.
  #[error("unknown action name: {0:?}")]
  UnknownAction(String),

  #[error("unknown period: {0:?}")]
  UnknownPeriod(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
