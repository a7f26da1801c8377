//! [`Engine`] — event handling, screen transitions, and action dispatch.

use std::{collections::HashMap, sync::Arc};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use ritual_core::{
  habit::Habit,
  period::Period,
  store::Store,
  streak,
  user::MAIN_SCREEN,
};

use crate::{
  Action, Error, Result,
  seed,
  transport::{Markup, PanelItem, Transport},
};

// ─── Events ──────────────────────────────────────────────────────────────────

/// A typed message from a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextEvent {
  pub user_id:  i64,
  #[serde(default)]
  pub username: Option<String>,
  pub text:     String,
}

/// An out-of-band action invocation. The payload is an action name followed
/// by zero or more `|`-delimited arguments, e.g. `info|<habit-id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
  pub user_id: i64,
  pub payload: String,
}

/// What triggered a dispatch: the typed text (for graph-driven actions
/// that consume it) or the pipe-delimited args (for callback payloads).
#[derive(Debug, Clone, Copy, Default)]
struct Invocation<'a> {
  text: Option<&'a str>,
  args: &'a [String],
}

impl<'a> Invocation<'a> {
  fn text(text: &'a str) -> Self {
    Self { text: Some(text), args: &[] }
  }

  fn args(args: &'a [String]) -> Self {
    Self { text: None, args }
  }
}

fn today() -> NaiveDate {
  Utc::now().date_naive()
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The conversation engine.
///
/// Holds an explicit store handle; the transport is passed per call so one
/// engine can serve many transport sessions. Events for the same user are
/// serialized through a per-user lock; events for different users run
/// concurrently.
pub struct Engine<S> {
  store: Arc<S>,
  locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl<S: Store> Engine<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, locks: Mutex::new(HashMap::new()) }
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  async fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
    let mut map = self.locks.lock().await;
    map.entry(user_id).or_default().clone()
  }

  // ── Event entry points ────────────────────────────────────────────────────

  /// Handle a typed message.
  ///
  /// A brand-new user (or an explicit `/start`) is bootstrapped through
  /// `start` then `main`, regardless of what was typed; normal resolution
  /// begins with their next message.
  pub async fn handle_text<T: Transport>(
    &self,
    transport: &T,
    event: &TextEvent,
  ) -> Result<()> {
    let lock = self.user_lock(event.user_id).await;
    let _guard = lock.lock().await;

    let user = self
      .store
      .get_user(event.user_id)
      .await
      .map_err(Error::store)?;

    let user = match user {
      Some(user) if event.text != "/start" => user,
      _ => {
        let user = self
          .store
          .upsert_user(event.user_id, event.username.clone())
          .await
          .map_err(Error::store)?;
        self.bootstrap(transport, user.user_id).await?;
        return Ok(());
      }
    };

    let screen = self
      .store
      .get_screen(&user.screen)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| {
        ritual_core::Error::ScreenNotFound(user.screen.clone())
      })?;

    if let Some(choice) = self
      .store
      .find_choice(&screen.name, &event.text)
      .await
      .map_err(Error::store)?
    {
      tracing::debug!(
        user = user.user_id,
        from = %screen.name,
        to = %choice.target,
        "screen transition"
      );
      self.enter(transport, user.user_id, &choice.target).await?;
      if let Some(name) = &choice.action {
        let action: Action = name.parse()?;
        self
          .run(transport, user.user_id, action, Invocation::text(&event.text))
          .await?;
      }
      return Ok(());
    }

    if let Some(name) = &screen.fallback {
      let action: Action = name.parse()?;
      self
        .run(transport, user.user_id, action, Invocation::text(&event.text))
        .await?;
    }

    Ok(())
  }

  /// Handle an out-of-band action invocation. The user's screen is not
  /// touched; actions that transition do so themselves.
  pub async fn handle_action<T: Transport>(
    &self,
    transport: &T,
    event: &ActionEvent,
  ) -> Result<()> {
    let lock = self.user_lock(event.user_id).await;
    let _guard = lock.lock().await;

    let mut parts = event.payload.split('|');
    let action: Action = parts.next().unwrap_or("").parse()?;
    let args: Vec<String> = parts.map(str::to_owned).collect();

    let user = self
      .store
      .get_user(event.user_id)
      .await
      .map_err(Error::store)?
      .ok_or(ritual_core::Error::UserNotFound(event.user_id))?;

    self
      .run(transport, user.user_id, action, Invocation::args(&args))
      .await
  }

  // ── Transitions and rendering ─────────────────────────────────────────────

  /// Move the user to `screen` and render it: every prompt in order, each
  /// carrying the screen's choice labels (or a clear when there are none).
  async fn enter<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    screen: &str,
  ) -> Result<()> {
    self
      .store
      .set_user_screen(user_id, screen)
      .await
      .map_err(Error::store)?;

    let prompts = self
      .store
      .screen_prompts(screen)
      .await
      .map_err(Error::store)?;
    let choices = self
      .store
      .screen_choices(screen)
      .await
      .map_err(Error::store)?;

    let markup = if choices.is_empty() {
      Markup::Clear
    } else {
      Markup::Choices(choices.into_iter().map(|c| c.label).collect())
    };

    for prompt in &prompts {
      transport
        .send(user_id, &prompt.text, &markup)
        .await
        .map_err(Error::transport)?;
    }
    Ok(())
  }

  async fn bootstrap<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
  ) -> Result<()> {
    self
      .enter(transport, user_id, ritual_core::user::START_SCREEN)
      .await?;
    self.enter(transport, user_id, MAIN_SCREEN).await
  }

  // ── Dispatch ──────────────────────────────────────────────────────────────

  async fn run<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    action: Action,
    inv: Invocation<'_>,
  ) -> Result<()> {
    match action {
      Action::Start => self.bootstrap(transport, user_id).await,
      Action::DiscardDraft => self
        .store
        .discard_drafts(user_id)
        .await
        .map_err(Error::store),
      Action::ShowHabits => {
        let refresh = inv.args.first().is_some_and(|a| a == "y");
        self.show_habits(transport, user_id, refresh).await
      }
      Action::NameHabit => {
        let name = inv.text.ok_or(Error::MissingArg {
          action: "name_habit",
          what:   "habit name",
        })?;
        self
          .store
          .add_draft(user_id, name)
          .await
          .map_err(Error::store)?;
        self.enter(transport, user_id, seed::PERIOD_SCREEN).await
      }
      Action::SetPeriod => {
        let label = inv.text.ok_or(Error::MissingArg {
          action: "set_period",
          what:   "period",
        })?;
        let period: Period = label.parse()?;
        self
          .store
          .promote_drafts(user_id, period)
          .await
          .map_err(Error::store)?;
        self.enter(transport, user_id, MAIN_SCREEN).await
      }
      Action::Info => {
        let id = habit_arg(action, inv)?;
        self.info(transport, user_id, id).await
      }
      Action::Complete => {
        let id = habit_arg(action, inv)?;
        self.complete(transport, user_id, id).await
      }
      Action::Star => {
        let id = habit_arg(action, inv)?;
        self.star(transport, user_id, id).await
      }
      Action::Delete => {
        let id = habit_arg(action, inv)?;
        self.delete(transport, user_id, id).await
      }
      Action::Stats => self.stats(transport, user_id).await,
      Action::PurgeMessage => self.purge_message(transport, user_id).await,
      Action::Fixture => {
        seed::demo_habits(self.store.as_ref(), user_id, today())
          .await
          .map_err(Error::store)?;
        self.show_habits(transport, user_id, true).await
      }
    }
  }

  // ── Habit panels ──────────────────────────────────────────────────────────

  /// Owner-scoped lookup that surfaces a missing or foreign habit id as an
  /// explicit not-found error. Drafts are not addressable by id either.
  async fn fetch_habit(
    &self,
    user_id: i64,
    habit_id: Uuid,
  ) -> Result<(Habit, Period)> {
    let habit = self
      .store
      .get_habit(user_id, habit_id)
      .await
      .map_err(Error::store)?
      .ok_or(ritual_core::Error::HabitNotFound(habit_id))?;
    let period = habit
      .period
      .ok_or(ritual_core::Error::HabitNotFound(habit_id))?;
    Ok((habit, period))
  }

  /// A fresh send records the new message id as the user's disposable
  /// panel; a refresh edits the recorded one, falling back to a fresh send
  /// when none is recorded.
  async fn send_panel<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    refresh: bool,
    text: &str,
    markup: &Markup,
  ) -> Result<()> {
    if refresh {
      let user = self
        .store
        .get_user(user_id)
        .await
        .map_err(Error::store)?
        .ok_or(ritual_core::Error::UserNotFound(user_id))?;
      if let Some(msg) = user.disposable_msg {
        transport
          .edit(user_id, msg, text, markup)
          .await
          .map_err(Error::transport)?;
        return Ok(());
      }
    }

    let msg = transport
      .send(user_id, text, markup)
      .await
      .map_err(Error::transport)?;
    self
      .store
      .set_disposable_msg(user_id, Some(msg))
      .await
      .map_err(Error::store)
  }

  async fn show_habits<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    refresh: bool,
  ) -> Result<()> {
    let habits = self
      .store
      .list_habits(user_id)
      .await
      .map_err(Error::store)?;
    let today = today();

    let (text, markup) = if habits.is_empty() {
      (
        "Seems that you don't have any habits yet".to_owned(),
        Markup::Panel(vec![vec![PanelItem::new(
          "Create demo habits",
          Action::Fixture.as_str(),
        )]]),
      )
    } else {
      let mut rows = Vec::with_capacity(habits.len());
      for habit in &habits {
        let Some(period) = habit.period else { continue };
        let dates = self
          .store
          .completion_dates(habit.habit_id)
          .await
          .map_err(Error::store)?;
        let star = if habit.starred { "⭐ " } else { "" };
        let mark = if streak::is_satisfied(period, &dates, today) {
          " ✔️"
        } else {
          " ❌"
        };
        rows.push(vec![PanelItem::new(
          format!("{star}{}{mark}", habit.name),
          format!("{}|{}", Action::Info.as_str(), habit.habit_id),
        )]);
      }
      (format!("Total: {}", habits.len()), Markup::Panel(rows))
    };

    self
      .send_panel(transport, user_id, refresh, &text, &markup)
      .await
  }

  async fn info<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    habit_id: Uuid,
  ) -> Result<()> {
    let (habit, period) = self.fetch_habit(user_id, habit_id).await?;
    let dates = self
      .store
      .completion_dates(habit_id)
      .await
      .map_err(Error::store)?;
    let today = today();

    let current = streak::current_streak(period, habit.created, &dates, today);
    let longest = streak::longest_streak(period, habit.created, &dates, today);

    let text = format!(
      "Name: {}\n\nStart date: {}\nPeriod: {}\nCurrent streak: {current}\nMax streak: {longest}",
      habit.name,
      habit.created,
      period.as_str(),
    );

    let mut rows = Vec::new();
    if !streak::is_satisfied(period, &dates, today) {
      rows.push(vec![PanelItem::new(
        "Complete",
        format!("{}|{habit_id}", Action::Complete.as_str()),
      )]);
    }
    let star_label = if habit.starred { "Unstar" } else { "Star" };
    rows.push(vec![
      PanelItem::new(star_label, format!("{}|{habit_id}", Action::Star.as_str())),
      PanelItem::new("Delete", format!("{}|{habit_id}", Action::Delete.as_str())),
    ]);
    rows.push(vec![PanelItem::new(
      "Back",
      format!("{}|y", Action::ShowHabits.as_str()),
    )]);

    self
      .send_panel(transport, user_id, true, &text, &Markup::Panel(rows))
      .await
  }

  async fn complete<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    habit_id: Uuid,
  ) -> Result<()> {
    let (habit, period) = self.fetch_habit(user_id, habit_id).await?;
    let dates = self
      .store
      .completion_dates(habit_id)
      .await
      .map_err(Error::store)?;
    let today = today();

    // Idempotent per period: a stale panel re-sending `complete` must not
    // pile up duplicate rows.
    if !streak::is_satisfied(period, &dates, today) {
      self
        .store
        .add_completion(habit.habit_id, today)
        .await
        .map_err(Error::store)?;
    }

    self.show_habits(transport, user_id, true).await
  }

  async fn star<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    habit_id: Uuid,
  ) -> Result<()> {
    let (habit, _) = self.fetch_habit(user_id, habit_id).await?;
    self
      .store
      .set_starred(habit_id, !habit.starred)
      .await
      .map_err(Error::store)?;
    self.info(transport, user_id, habit_id).await
  }

  async fn delete<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
    habit_id: Uuid,
  ) -> Result<()> {
    self.fetch_habit(user_id, habit_id).await?;
    self
      .store
      .delete_habit(habit_id)
      .await
      .map_err(Error::store)?;
    self.show_habits(transport, user_id, true).await
  }

  async fn stats<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
  ) -> Result<()> {
    let habits = self
      .store
      .list_habits(user_id)
      .await
      .map_err(Error::store)?;

    if habits.is_empty() {
      transport
        .send(user_id, "You don't have any habits yet", &Markup::Keep)
        .await
        .map_err(Error::transport)?;
      return Ok(());
    }

    let today = today();
    let mut text = format!("Total habits: {}\n", habits.len());

    for period in [Period::Daily, Period::Weekly, Period::Monthly] {
      let mut best: u32 = 0;
      let mut best_habit: Option<&Habit> = None;
      for habit in habits.iter().filter(|h| h.period == Some(period)) {
        let dates = self
          .store
          .completion_dates(habit.habit_id)
          .await
          .map_err(Error::store)?;
        let longest =
          streak::longest_streak(period, habit.created, &dates, today);
        if longest > best {
          best = longest;
          best_habit = Some(habit);
        }
      }
      if let Some(habit) = best_habit {
        text.push_str(&format!(
          "\nLongest {} streak: {}, {best}",
          period.as_str().to_lowercase(),
          habit.name,
        ));
      }
    }

    transport
      .send(user_id, &text, &Markup::Keep)
      .await
      .map_err(Error::transport)?;
    Ok(())
  }

  async fn purge_message<T: Transport>(
    &self,
    transport: &T,
    user_id: i64,
  ) -> Result<()> {
    let user = self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(ritual_core::Error::UserNotFound(user_id))?;

    if let Some(msg) = user.disposable_msg {
      transport
        .delete(user_id, msg)
        .await
        .map_err(Error::transport)?;
      self
        .store
        .set_disposable_msg(user_id, None)
        .await
        .map_err(Error::store)?;
    }
    Ok(())
  }
}

/// The habit-id argument of an `action|id` payload.
fn habit_arg(action: Action, inv: Invocation<'_>) -> Result<Uuid> {
  let raw = inv.args.first().ok_or(Error::MissingArg {
    action: action.as_str(),
    what:   "habit id",
  })?;
  Uuid::parse_str(raw).map_err(|_| Error::BadHabitId(raw.clone()))
}
