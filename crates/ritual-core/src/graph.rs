//! The dialogue graph: screens, their prompts, and their outgoing choices.
//!
//! The graph is configuration, not code. It is seeded once at first boot
//! and read-only afterwards; the conversation engine walks it to decide
//! which screen to show and which action to run next.

use serde::{Deserialize, Serialize};

/// A node in the dialogue graph — the unit of "where the user currently
/// is". The name is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
  pub name:     String,
  /// Action name run when no choice label matches the user's input.
  pub fallback: Option<String>,
}

/// Ordered text shown when a screen is entered. A screen may carry zero,
/// one, or many prompts, rendered in ascending `order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
  pub screen: String,
  pub text:   String,
  pub order:  i64,
}

/// A labelled edge from one screen to another. Selecting a choice whose
/// label equals the input always transitions `current -> target`, then
/// optionally runs the named action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
  pub current: String,
  pub target:  String,
  pub label:   String,
  pub action:  Option<String>,
  pub order:   i64,
}
