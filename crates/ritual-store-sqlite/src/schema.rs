//! SQL schema for the Ritual SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Dialogue graph: seeded once at first boot, read-only afterwards.
CREATE TABLE IF NOT EXISTS screens (
    name     TEXT PRIMARY KEY,
    fallback TEXT               -- action run when no choice label matches
);

CREATE TABLE IF NOT EXISTS prompts (
    prompt_id INTEGER PRIMARY KEY AUTOINCREMENT,
    screen    TEXT NOT NULL REFERENCES screens(name),
    text      TEXT NOT NULL,
    ord       INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS choices (
    choice_id INTEGER PRIMARY KEY AUTOINCREMENT,
    current   TEXT NOT NULL REFERENCES screens(name),
    target    TEXT NOT NULL REFERENCES screens(name),
    label     TEXT NOT NULL,
    action    TEXT,
    ord       INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS users (
    user_id        INTEGER PRIMARY KEY,   -- transport-assigned
    username       TEXT,
    created        TEXT NOT NULL,         -- ISO 8601 date
    screen         TEXT NOT NULL DEFAULT 'main' REFERENCES screens(name),
    disposable_msg INTEGER
);

CREATE TABLE IF NOT EXISTS habits (
    habit_id TEXT PRIMARY KEY,
    owner    INTEGER NOT NULL REFERENCES users(user_id),
    name     TEXT NOT NULL,
    created  TEXT NOT NULL,
    period   TEXT,                        -- 'Daily'|'Weekly'|'Monthly'; NULL = draft
    starred  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS completions (
    completion_id INTEGER PRIMARY KEY AUTOINCREMENT,
    habit_id      TEXT NOT NULL REFERENCES habits(habit_id),
    on_date       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS prompts_screen_idx    ON prompts(screen);
CREATE INDEX IF NOT EXISTS choices_current_idx   ON choices(current);
CREATE INDEX IF NOT EXISTS habits_owner_idx      ON habits(owner);
CREATE INDEX IF NOT EXISTS completions_habit_idx ON completions(habit_id);

PRAGMA user_version = 1;
";
