//! [`SqliteStore`] — the SQLite implementation of [`Store`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use ritual_core::{
  graph::{Choice, Prompt, Screen},
  habit::Habit,
  period::Period,
  store::Store,
  user::{MAIN_SCREEN, MessageId, User},
};

use crate::{
  Error, Result,
  encode::{
    RawHabit, RawUser, encode_date, encode_period, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Ritual store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(
    &self,
    user_id: i64,
    username: Option<String>,
  ) -> Result<User> {
    let created = encode_date(Utc::now().date_naive());

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO users (user_id, username, created, screen)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id, username, created, MAIN_SCREEN],
        )?;
        conn.query_row(
          "SELECT user_id, username, created, screen, disposable_msg
           FROM users WHERE user_id = ?1",
          rusqlite::params![user_id],
          |row| {
            Ok(RawUser {
              user_id:        row.get(0)?,
              username:       row.get(1)?,
              created:        row.get(2)?,
              screen:         row.get(3)?,
              disposable_msg: row.get(4)?,
            })
          },
        )
        .map_err(Into::into)
      })
      .await?;

    raw.into_user()
  }

  async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, created, screen, disposable_msg
               FROM users WHERE user_id = ?1",
              rusqlite::params![user_id],
              |row| {
                Ok(RawUser {
                  user_id:        row.get(0)?,
                  username:       row.get(1)?,
                  created:        row.get(2)?,
                  screen:         row.get(3)?,
                  disposable_msg: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn set_user_screen(&self, user_id: i64, screen: &str) -> Result<()> {
    let screen = screen.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET screen = ?2 WHERE user_id = ?1",
          rusqlite::params![user_id, screen],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_disposable_msg(
    &self,
    user_id: i64,
    msg: Option<MessageId>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET disposable_msg = ?2 WHERE user_id = ?1",
          rusqlite::params![user_id, msg],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Dialogue graph ────────────────────────────────────────────────────────

  async fn add_screen(&self, screen: Screen) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO screens (name, fallback) VALUES (?1, ?2)",
          rusqlite::params![screen.name, screen.fallback],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_prompt(&self, prompt: Prompt) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO prompts (screen, text, ord) VALUES (?1, ?2, ?3)",
          rusqlite::params![prompt.screen, prompt.text, prompt.order],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_choice(&self, choice: Choice) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO choices (current, target, label, action, ord)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            choice.current,
            choice.target,
            choice.label,
            choice.action,
            choice.order,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_screen(&self, name: &str) -> Result<Option<Screen>> {
    let name = name.to_owned();
    let screen = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name, fallback FROM screens WHERE name = ?1",
              rusqlite::params![name],
              |row| {
                Ok(Screen { name: row.get(0)?, fallback: row.get(1)? })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(screen)
  }

  async fn screen_prompts(&self, screen: &str) -> Result<Vec<Prompt>> {
    let screen = screen.to_owned();
    let prompts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT screen, text, ord FROM prompts
           WHERE screen = ?1 ORDER BY ord ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![screen], |row| {
            Ok(Prompt {
              screen: row.get(0)?,
              text:   row.get(1)?,
              order:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(prompts)
  }

  async fn screen_choices(&self, screen: &str) -> Result<Vec<Choice>> {
    let screen = screen.to_owned();
    let choices = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT current, target, label, action, ord FROM choices
           WHERE current = ?1 ORDER BY ord ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![screen], |row| {
            Ok(Choice {
              current: row.get(0)?,
              target:  row.get(1)?,
              label:   row.get(2)?,
              action:  row.get(3)?,
              order:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(choices)
  }

  async fn find_choice(
    &self,
    screen: &str,
    label: &str,
  ) -> Result<Option<Choice>> {
    let screen = screen.to_owned();
    let label = label.to_owned();
    let choice = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT current, target, label, action, ord FROM choices
               WHERE current = ?1 AND label = ?2",
              rusqlite::params![screen, label],
              |row| {
                Ok(Choice {
                  current: row.get(0)?,
                  target:  row.get(1)?,
                  label:   row.get(2)?,
                  action:  row.get(3)?,
                  order:   row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(choice)
  }

  async fn screen_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        conn
          .query_row("SELECT COUNT(*) FROM screens", [], |row| row.get(0))
          .map_err(Into::into)
      })
      .await?;
    Ok(count as u64)
  }

  async fn all_screens(&self) -> Result<Vec<Screen>> {
    let screens = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name, fallback FROM screens")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Screen { name: row.get(0)?, fallback: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(screens)
  }

  async fn all_choices(&self) -> Result<Vec<Choice>> {
    let choices = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT current, target, label, action, ord FROM choices")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Choice {
              current: row.get(0)?,
              target:  row.get(1)?,
              label:   row.get(2)?,
              action:  row.get(3)?,
              order:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(choices)
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn add_habit(&self, habit: Habit) -> Result<()> {
    let id_str      = encode_uuid(habit.habit_id);
    let created_str = encode_date(habit.created);
    let period_str  = habit.period.map(encode_period);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habits (habit_id, owner, name, created, period, starred)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            habit.owner,
            habit.name,
            created_str,
            period_str,
            habit.starred,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_draft(&self, owner: i64, name: &str) -> Result<Habit> {
    let habit = Habit {
      habit_id: Uuid::new_v4(),
      owner,
      name:     name.to_owned(),
      created:  Utc::now().date_naive(),
      period:   None,
      starred:  false,
    };

    let id_str      = encode_uuid(habit.habit_id);
    let name_str    = habit.name.clone();
    let created_str = encode_date(habit.created);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // At most one draft per owner: replace any leftover draft.
        tx.execute(
          "DELETE FROM habits WHERE owner = ?1 AND period IS NULL",
          rusqlite::params![owner],
        )?;
        tx.execute(
          "INSERT INTO habits (habit_id, owner, name, created, period, starred)
           VALUES (?1, ?2, ?3, ?4, NULL, 0)",
          rusqlite::params![id_str, owner, name_str, created_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(habit)
  }

  async fn discard_drafts(&self, owner: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM habits WHERE owner = ?1 AND period IS NULL",
          rusqlite::params![owner],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn promote_drafts(&self, owner: i64, period: Period) -> Result<()> {
    let period_str = encode_period(period);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE habits SET period = ?2 WHERE owner = ?1 AND period IS NULL",
          rusqlite::params![owner, period_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_habits(&self, owner: i64) -> Result<Vec<Habit>> {
    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT habit_id, owner, name, created, period, starred FROM habits
           WHERE owner = ?1 AND period IS NOT NULL
           ORDER BY starred DESC, rowid ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner], |row| {
            Ok(RawHabit {
              habit_id: row.get(0)?,
              owner:    row.get(1)?,
              name:     row.get(2)?,
              created:  row.get(3)?,
              period:   row.get(4)?,
              starred:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  async fn get_habit(&self, owner: i64, habit_id: Uuid) -> Result<Option<Habit>> {
    let id_str = encode_uuid(habit_id);
    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT habit_id, owner, name, created, period, starred
               FROM habits WHERE owner = ?1 AND habit_id = ?2",
              rusqlite::params![owner, id_str],
              |row| {
                Ok(RawHabit {
                  habit_id: row.get(0)?,
                  owner:    row.get(1)?,
                  name:     row.get(2)?,
                  created:  row.get(3)?,
                  period:   row.get(4)?,
                  starred:  row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn set_starred(&self, habit_id: Uuid, starred: bool) -> Result<()> {
    let id_str = encode_uuid(habit_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE habits SET starred = ?2 WHERE habit_id = ?1",
          rusqlite::params![id_str, starred],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_habit(&self, habit_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(habit_id);
    self
      .conn
      .call(move |conn| {
        // Completions and the habit go together or not at all; re-running
        // on an already-deleted id deletes nothing and succeeds.
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM completions WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM habits WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_completion(&self, habit_id: Uuid, on: NaiveDate) -> Result<()> {
    let id_str = encode_uuid(habit_id);
    let on_str = encode_date(on);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO completions (habit_id, on_date) VALUES (?1, ?2)",
          rusqlite::params![id_str, on_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn completion_dates(&self, habit_id: Uuid) -> Result<Vec<NaiveDate>> {
    let id_str = encode_uuid(habit_id);
    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT on_date FROM completions
           WHERE habit_id = ?1 ORDER BY on_date ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw.iter().map(|s| crate::encode::decode_date(s)).collect()
  }
}
