//! Error type for `ritual-engine`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ritual_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("transport error: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// An action was invoked without the argument it consumes.
  #[error("action {action} is missing its {what} argument")]
  MissingArg {
    action: &'static str,
    what:   &'static str,
  },

  #[error("malformed habit id: {0:?}")]
  BadHabitId(String),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn transport<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Transport(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
