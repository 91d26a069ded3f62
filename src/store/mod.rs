//! SQLite persistence for tasks and notes.
//!
//! Two append-mostly tables. Schema creation is idempotent and happens when
//! the store is opened. The only update anywhere is the due-date attachment,
//! done as a single atomic statement; nothing is ever deleted.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid timestamp in row {id}: {value}")]
    BadTimestamp { id: i64, value: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A task stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: i64,
    pub content: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// A note stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteRecord {
    pub id: i64,
    pub content: String,
}

/// SQLite-backed store for tasks and notes.
///
/// The connection sits behind a mutex; every operation is a single statement,
/// so locks are held only for the duration of one synchronous call.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// Open an in-memory database, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                content  TEXT NOT NULL,
                due_date TEXT
             );
             CREATE TABLE IF NOT EXISTS notes (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL
             );",
        )?;
        tracing::debug!("Store schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means another thread panicked mid-statement;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a task with no due date and return the stored record.
    pub fn add_task(&self, content: &str) -> StoreResult<TaskRecord> {
        let conn = self.lock();
        conn.execute("INSERT INTO tasks (content) VALUES (?1)", [content])?;
        let id = conn.last_insert_rowid();
        Ok(TaskRecord {
            id,
            content: content.to_string(),
            due_date: None,
        })
    }

    /// Insert a note and return the stored record.
    pub fn add_note(&self, content: &str) -> StoreResult<NoteRecord> {
        let conn = self.lock();
        conn.execute("INSERT INTO notes (content) VALUES (?1)", [content])?;
        let id = conn.last_insert_rowid();
        Ok(NoteRecord {
            id,
            content: content.to_string(),
        })
    }

    /// All tasks, due date ascending with undated tasks last, ties by id.
    pub fn tasks_by_due(&self) -> StoreResult<Vec<TaskRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, content, due_date
             FROM tasks
             ORDER BY due_date IS NULL, due_date ASC, id ASC",
        )?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(row_to_task(row)?);
        }
        Ok(tasks)
    }

    /// All notes in insertion order.
    pub fn notes_in_order(&self) -> StoreResult<Vec<NoteRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, content FROM notes ORDER BY id ASC")?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(NoteRecord {
                id: row.get(0)?,
                content: row.get(1)?,
            });
        }
        Ok(notes)
    }

    /// Attach a due date to the most recently created task with the given
    /// content. Read-then-mutate is collapsed into one statement so two
    /// concurrent resolutions cannot interleave.
    ///
    /// Returns the updated record, or `None` when no task matches.
    pub fn set_due_for_latest(
        &self,
        content: &str,
        due: DateTime<Utc>,
    ) -> StoreResult<Option<TaskRecord>> {
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE tasks
             SET due_date = ?2
             WHERE id = (SELECT max(id) FROM tasks WHERE content = ?1)",
            params![content, due.to_rfc3339()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        conn.query_row(
            "SELECT id, content, due_date
             FROM tasks
             WHERE id = (SELECT max(id) FROM tasks WHERE content = ?1)",
            [content],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?
        .map(|(id, content, due_date)| {
            Ok(TaskRecord {
                id,
                content,
                due_date: parse_due(id, due_date)?,
            })
        })
        .transpose()
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> StoreResult<TaskRecord> {
    let id: i64 = row.get(0)?;
    let content: String = row.get(1)?;
    let due_date: Option<String> = row.get(2)?;
    Ok(TaskRecord {
        id,
        content,
        due_date: parse_due(id, due_date)?,
    })
}

fn parse_due(id: i64, value: Option<String>) -> StoreResult<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| StoreError::BadTimestamp { id, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn tasks_ordered_by_due_nulls_last() {
        let store = Store::open_in_memory().unwrap();
        store.add_task("undated one").unwrap();
        store.add_task("later").unwrap();
        store.add_task("sooner").unwrap();
        store
            .set_due_for_latest("later", utc(2026, 9, 2, 9))
            .unwrap();
        store
            .set_due_for_latest("sooner", utc(2026, 9, 1, 9))
            .unwrap();

        let tasks = store.tasks_by_due().unwrap();
        let contents: Vec<_> = tasks.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["sooner", "later", "undated one"]);
        assert!(tasks[2].due_date.is_none());
    }

    #[test]
    fn due_date_attaches_to_most_recent_match() {
        let store = Store::open_in_memory().unwrap();
        let first = store.add_task("buy milk").unwrap();
        let second = store.add_task("buy milk").unwrap();

        let updated = store
            .set_due_for_latest("buy milk", utc(2026, 9, 1, 9))
            .unwrap()
            .expect("a task should match");
        assert_eq!(updated.id, second.id);
        assert_ne!(updated.id, first.id);
        assert_eq!(updated.due_date, Some(utc(2026, 9, 1, 9)));

        // The earlier duplicate is untouched.
        let tasks = store.tasks_by_due().unwrap();
        let earlier = tasks.iter().find(|t| t.id == first.id).unwrap();
        assert!(earlier.due_date.is_none());
    }

    #[test]
    fn set_due_without_match_is_none() {
        let store = Store::open_in_memory().unwrap();
        let result = store
            .set_due_for_latest("nothing here", utc(2026, 9, 1, 9))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn notes_keep_insertion_order() {
        let store = Store::open_in_memory().unwrap();
        store.add_note("first").unwrap();
        store.add_note("second").unwrap();
        let notes = store.notes_in_order().unwrap();
        assert_eq!(notes[0].content, "first");
        assert_eq!(notes[1].content, "second");
    }

    #[test]
    fn schema_create_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daybook.db");
        {
            let store = Store::open(&path).unwrap();
            store.add_task("survives reopen").unwrap();
        }
        let store = Store::open(&path).unwrap();
        let tasks = store.tasks_by_due().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].content, "survives reopen");
    }
}
