//! The `Store` trait — persistence for users, the dialogue graph, and
//! habits.
//!
//! The trait is implemented by storage backends (e.g.
//! `ritual-store-sqlite`). The conversation engine depends on this
//! abstraction, not on any concrete backend, and receives the handle at
//! construction.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  graph::{Choice, Prompt, Screen},
  habit::Habit,
  period::Period,
  user::{MessageId, User},
};

/// Abstraction over a Ritual store backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes. Every call is an independent suspension
/// point; cross-call atomicity (e.g. the habit cascade delete) is the
/// backend's responsibility.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create the user if absent and return the stored row.
  ///
  /// Racing creations on first contact are benign: the existing row wins
  /// and is returned unchanged.
  fn upsert_user(
    &self,
    user_id: i64,
    username: Option<String>,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Persist the user's current screen.
  fn set_user_screen<'a>(
    &'a self,
    user_id: i64,
    screen: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Record (or clear) the id of the user's disposable panel message.
  fn set_disposable_msg(
    &self,
    user_id: i64,
    msg: Option<MessageId>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Dialogue graph — seeded once, read-mostly ─────────────────────────

  fn add_screen(
    &self,
    screen: Screen,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_prompt(
    &self,
    prompt: Prompt,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_choice(
    &self,
    choice: Choice,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_screen<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Screen>, Self::Error>> + Send + 'a;

  /// Prompts of a screen in ascending `order`.
  fn screen_prompts<'a>(
    &'a self,
    screen: &'a str,
  ) -> impl Future<Output = Result<Vec<Prompt>, Self::Error>> + Send + 'a;

  /// Outgoing choices of a screen in ascending `order`.
  fn screen_choices<'a>(
    &'a self,
    screen: &'a str,
  ) -> impl Future<Output = Result<Vec<Choice>, Self::Error>> + Send + 'a;

  /// The choice on `screen` whose label equals `label` exactly, if any.
  /// Matching is scoped to the given screen only.
  fn find_choice<'a>(
    &'a self,
    screen: &'a str,
    label: &'a str,
  ) -> impl Future<Output = Result<Option<Choice>, Self::Error>> + Send + 'a;

  /// Number of screens — zero means the graph has not been seeded yet.
  fn screen_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// All screens; used by startup validation.
  fn all_screens(
    &self,
  ) -> impl Future<Output = Result<Vec<Screen>, Self::Error>> + Send + '_;

  /// All choices; used by startup validation.
  fn all_choices(
    &self,
  ) -> impl Future<Output = Result<Vec<Choice>, Self::Error>> + Send + '_;

  // ── Habits ────────────────────────────────────────────────────────────

  /// Insert a fully-built habit row, e.g. from the demo fixture.
  fn add_habit(
    &self,
    habit: Habit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Create a draft habit (no period yet) for `owner`, discarding any
  /// previous draft first so at most one draft per owner exists.
  fn add_draft<'a>(
    &'a self,
    owner: i64,
    name: &'a str,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + 'a;

  /// Delete the owner's pending drafts, if any.
  fn discard_drafts(
    &self,
    owner: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Assign `period` to the owner's pending drafts, making them listable.
  fn promote_drafts(
    &self,
    owner: i64,
    period: Period,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The owner's non-draft habits, starred first.
  fn list_habits(
    &self,
    owner: i64,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  /// Owner-scoped point lookup. `None` when the habit does not exist or
  /// belongs to someone else.
  fn get_habit(
    &self,
    owner: i64,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  fn set_starred(
    &self,
    habit_id: Uuid,
    starred: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a habit and all its completions atomically. Deleting an id
  /// that no longer exists is a no-op, so the operation is retry-safe.
  fn delete_habit(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_completion(
    &self,
    habit_id: Uuid,
    on: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every recorded completion date of a habit, ascending.
  fn completion_dates(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<NaiveDate>, Self::Error>> + Send + '_;
}
