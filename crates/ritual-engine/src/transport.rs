//! The boundary with the message-transport collaborator.
//!
//! The engine renders by calling these three operations; everything about
//! the actual messaging platform (delivery, message ids, retries) lives on
//! the other side of the trait.

use std::future::Future;

use ritual_core::user::MessageId;
use serde::{Deserialize, Serialize};

/// An inline panel item: a label plus the `action|arg` callback payload it
/// fires when selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelItem {
  pub label:   String,
  pub payload: String,
}

impl PanelItem {
  pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
    Self { label: label.into(), payload: payload.into() }
  }
}

/// What accompanies an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Markup {
  /// The current screen's choice labels, shown as a selectable list.
  Choices(Vec<String>),
  /// Remove any previously shown choice list.
  Clear,
  /// Leave whatever the previous message established untouched.
  Keep,
  /// Rows of inline items, independent of the screen/choice graph.
  Panel(Vec<Vec<PanelItem>>),
}

/// Messaging operations the engine needs. All futures are `Send` so the
/// engine can run on a multi-threaded runtime.
pub trait Transport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Deliver a message and return the transport-assigned id.
  fn send<'a>(
    &'a self,
    user_id: i64,
    text: &'a str,
    markup: &'a Markup,
  ) -> impl Future<Output = Result<MessageId, Self::Error>> + Send + 'a;

  /// Replace the text and markup of a previously sent message.
  fn edit<'a>(
    &'a self,
    user_id: i64,
    msg: MessageId,
    text: &'a str,
    markup: &'a Markup,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove a previously sent message.
  fn delete(
    &self,
    user_id: i64,
    msg: MessageId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
