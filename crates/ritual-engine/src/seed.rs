//! Dialogue-graph seeding, startup validation, and the demo fixture.
//!
//! The graph is configuration: these tables are written once at first boot
//! and only read afterwards. Validation runs at every boot so a graph that
//! references an unimplemented action or a dangling screen fails loudly
//! before any event is handled.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use ritual_core::{
  graph::{Choice, Prompt, Screen},
  habit::Habit,
  period::Period,
  store::Store,
  user::{MAIN_SCREEN, START_SCREEN},
};
use uuid::Uuid;

use crate::{Action, Error, Result};

/// The period-selection screen entered after a habit name is captured.
pub const PERIOD_SCREEN: &str = "new_habit_period";

// ─── Graph seeding ───────────────────────────────────────────────────────────

/// Seed the dialogue graph unless the store already holds one.
pub async fn ensure_graph<S: Store>(store: &S) -> Result<(), S::Error> {
  if store.screen_count().await? > 0 {
    return Ok(());
  }
  tracing::info!("seeding dialogue graph");

  let screens = [
    (START_SCREEN, None),
    (MAIN_SCREEN, None),
    ("new_habit", Some(Action::NameHabit)),
    ("my_habits", None),
    (PERIOD_SCREEN, None),
    ("habit_created", None),
    ("my_stats", None),
  ];
  for (name, fallback) in screens {
    store
      .add_screen(Screen {
        name:     name.to_owned(),
        fallback: fallback.map(|a| a.as_str().to_owned()),
      })
      .await?;
  }

  let prompts = [
    (START_SCREEN, "Welcome to Ritual, a habit tracking app!"),
    (MAIN_SCREEN, "Main menu"),
    ("new_habit", "Enter new habit's description"),
    ("my_habits", "List of your habits:"),
    (PERIOD_SCREEN, "Choose habit period"),
    ("habit_created", "New habit created successfully"),
    ("my_stats", "Here's your stats:"),
  ];
  for (screen, text) in prompts {
    store
      .add_prompt(Prompt {
        screen: screen.to_owned(),
        text:   text.to_owned(),
        order:  1,
      })
      .await?;
  }

  let choices = [
    (MAIN_SCREEN, "new_habit", "New habit", Some(Action::DiscardDraft), 1),
    (MAIN_SCREEN, "my_habits", "My habits", Some(Action::ShowHabits), 2),
    (MAIN_SCREEN, "my_stats", "My stats", Some(Action::Stats), 3),
    ("my_habits", MAIN_SCREEN, "Back", Some(Action::PurgeMessage), 1),
    ("my_stats", MAIN_SCREEN, "Back", None, 1),
    ("new_habit", MAIN_SCREEN, "Back", None, 1),
    (PERIOD_SCREEN, "habit_created", "Daily", Some(Action::SetPeriod), 1),
    (PERIOD_SCREEN, "habit_created", "Weekly", Some(Action::SetPeriod), 2),
    (PERIOD_SCREEN, "habit_created", "Monthly", Some(Action::SetPeriod), 3),
    (PERIOD_SCREEN, "new_habit", "Back", Some(Action::DiscardDraft), 4),
  ];
  for (current, target, label, action, order) in choices {
    store
      .add_choice(Choice {
        current: current.to_owned(),
        target:  target.to_owned(),
        label:   label.to_owned(),
        action:  action.map(|a| a.as_str().to_owned()),
        order,
      })
      .await?;
  }

  Ok(())
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check graph integrity: every choice endpoint names an existing screen
/// and every referenced action name is implemented by the registry.
pub async fn validate_graph<S: Store>(store: &S) -> Result<()> {
  let screens = store.all_screens().await.map_err(Error::store)?;
  let names: HashSet<&str> = screens.iter().map(|s| s.name.as_str()).collect();

  for screen in &screens {
    if let Some(action) = &screen.fallback {
      action.parse::<Action>()?;
    }
  }

  for choice in store.all_choices().await.map_err(Error::store)? {
    for endpoint in [&choice.current, &choice.target] {
      if !names.contains(endpoint.as_str()) {
        return Err(
          ritual_core::Error::ScreenNotFound(endpoint.clone()).into(),
        );
      }
    }
    if let Some(action) = &choice.action {
      action.parse::<Action>()?;
    }
  }

  Ok(())
}

// ─── Demo fixture ────────────────────────────────────────────────────────────

/// Five predefined habits with a year of back-dated history, for trying
/// the app without weeks of real tracking.
pub async fn demo_habits<S: Store>(
  store: &S,
  owner: i64,
  today: NaiveDate,
) -> Result<(), S::Error> {
  let created = today - Days::new(365);

  let habit = |name: &str, period: Period, starred: bool| Habit {
    habit_id: Uuid::new_v4(),
    owner,
    name: name.to_owned(),
    created,
    period: Some(period),
    starred,
  };

  let water = habit("Drink enough water", Period::Daily, false);
  let workout = habit("Work out", Period::Daily, false);
  let laundry = habit("Wash clothes", Period::Weekly, false);
  let tidying = habit("Tidy the house", Period::Weekly, false);
  let parents = habit("Visit parents", Period::Monthly, true);

  let mut completions: Vec<(Uuid, NaiveDate)> = Vec::new();

  // A perfect daily record, and one with days 7 and 22 missed.
  for i in 1..29 {
    completions.push((water.habit_id, today - Days::new(i)));
  }
  for i in (1..29).filter(|i| *i != 7 && *i != 22) {
    completions.push((workout.habit_id, today - Days::new(i)));
  }

  // Four straight weeks, and the same with week 2 missed.
  for i in 1..5 {
    completions.push((laundry.habit_id, today - Days::new(7 * i)));
  }
  for i in (1..5).filter(|i| *i != 2) {
    completions.push((tidying.habit_id, today - Days::new(7 * i)));
  }

  // Months 1..=4 back; month 5 missed.
  let mut month = Period::Monthly.start(today);
  for i in 1..6 {
    month = Period::Monthly.previous(month);
    if i != 5 {
      completions.push((parents.habit_id, month));
    }
  }

  for habit in [&water, &workout, &laundry, &tidying, &parents] {
    store.add_habit((*habit).clone()).await?;
  }
  for (habit_id, on) in completions {
    store.add_completion(habit_id, on).await?;
  }

  Ok(())
}
