//! User records — the dialogue state machine's only per-user state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Transport-assigned identifier of a sent message.
pub type MessageId = i64;

/// The screen every user sits on after bootstrap; the graph is expected to
/// always be navigable back toward it.
pub const MAIN_SCREEN: &str = "main";

/// The screen shown exactly once to a brand-new user, before `main`.
pub const START_SCREEN: &str = "start";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:        i64,
  pub username:       Option<String>,
  pub created:        NaiveDate,
  /// Name of the screen the user is currently on — the single state
  /// variable of the conversation engine.
  pub screen:         String,
  /// Id of the most recent disposable panel message sent to the user,
  /// kept so a later event can edit or delete it in place.
  pub disposable_msg: Option<MessageId>,
}
