use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rusqlite::{params, Connection};
use time::format_description::{self, FormatItem};
use time::OffsetDateTime;

use crate::config::StorageOptions;
use crate::list::{CollectionStore, ListItem};

mod schema;

/// Display timestamp format, e.g. `09 Jun 2025, 05:30 PM`.
static DATE_TIME_FORMAT: Lazy<Vec<FormatItem<'static>>> = Lazy::new(|| {
    format_description::parse(
        "[day] [month repr:short] [year], [hour repr:12]:[minute] [period case:upper]",
    )
    .expect("valid date format description")
});

/// A note row. The id is assigned by the store on first insert and never
/// changes afterwards; `NoteRecord::draft` builds the pre-insert form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Store-assigned at write time, `dd MMM yyyy, hh:mm a`.
    pub date_time: String,
}

impl NoteRecord {
    /// Id value a draft carries before its first successful insert. SQLite
    /// row ids start at 1, so this never collides with a stored note.
    pub const UNASSIGNED: i64 = 0;

    pub fn draft(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Self::UNASSIGNED,
            title: title.into(),
            body: body.into(),
            date_time: String::new(),
        }
    }
}

impl ListItem for NoteRecord {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    fn search_title(&self) -> &str {
        &self.title
    }
}

#[derive(Clone)]
pub struct NoteStore {
    db_path: Arc<PathBuf>,
}

impl NoteStore {
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&*self.db_path)
            .with_context(|| format!("opening database {}", self.db_path.display()))?;
        prepare_connection(&conn)?;
        Ok(conn)
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Inserts a new note, assigning its id and timestamp. The incoming
    /// record's id is ignored; the returned record carries the stored form.
    pub fn insert_note(&self, title: &str, body: &str) -> Result<NoteRecord> {
        let date_time = current_date_time()?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO notes (title, body, date_time) VALUES (?1, ?2, ?3)",
                params![title, body, date_time],
            )
            .context("inserting note")?;
            Ok(NoteRecord {
                id: conn.last_insert_rowid(),
                title: title.to_string(),
                body: body.to_string(),
                date_time: date_time.clone(),
            })
        })
    }

    /// Full replace keyed by id, refreshing the timestamp. Updating an id
    /// that is no longer present is a silent no-op.
    pub fn update_note(&self, note: &NoteRecord) -> Result<NoteRecord> {
        let date_time = current_date_time()?;
        self.with_connection(|conn| {
            let updated = conn
                .execute(
                    "UPDATE notes SET title = ?1, body = ?2, date_time = ?3 WHERE id = ?4",
                    params![note.title, note.body, date_time, note.id],
                )
                .context("updating note")?;
            if updated == 0 {
                tracing::debug!(note_id = note.id, "update for missing note ignored");
            }
            Ok(NoteRecord {
                date_time: date_time.clone(),
                ..note.clone()
            })
        })
    }

    /// Hard delete keyed by id; deleting a missing id is a silent no-op.
    pub fn delete_note(&self, note_id: i64) -> Result<()> {
        self.with_connection(|conn| {
            let deleted = conn
                .execute("DELETE FROM notes WHERE id = ?1", params![note_id])
                .context("deleting note")?;
            if deleted == 0 {
                tracing::debug!(note_id, "delete for missing note ignored");
            }
            Ok(())
        })
    }

    /// All notes in store order (ascending id), treated as stable for
    /// display.
    pub fn all_notes(&self) -> Result<Vec<NoteRecord>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, title, body, date_time FROM notes ORDER BY id")?;
            let records = stmt
                .query_map([], |row| {
                    Ok(NoteRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        body: row.get(2)?,
                        date_time: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("querying notes")?;
            Ok(records)
        })
    }
}

impl CollectionStore<NoteRecord> for NoteStore {
    fn insert(&mut self, item: NoteRecord) -> Result<NoteRecord> {
        self.insert_note(&item.title, &item.body)
    }

    fn remove(&mut self, items: &[NoteRecord]) -> Result<()> {
        for item in items {
            self.delete_note(item.id)?;
        }
        Ok(())
    }

    fn update(&mut self, item: &NoteRecord) -> Result<NoteRecord> {
        self.update_note(item)
    }
}

pub fn init(options: &StorageOptions) -> Result<NoteStore> {
    let db_path = &options.database_path;
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let conn = Connection::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    prepare_connection(&conn)?;
    schema::apply(&conn)?;
    Ok(NoteStore {
        db_path: Arc::new(db_path.clone()),
    })
}

fn prepare_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("setting journal_mode=WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .context("setting synchronous=NORMAL")?;
    Ok(())
}

fn current_date_time() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&DATE_TIME_FORMAT)
        .context("formatting note timestamp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store(root: &TempDir) -> Result<NoteStore> {
        let options = StorageOptions {
            database_path: root.path().join("data").join("notes.db"),
            ..StorageOptions::default()
        };
        init(&options)
    }

    #[test]
    fn insert_assigns_ids_and_timestamps() -> Result<()> {
        let temp = TempDir::new()?;
        let store = temp_store(&temp)?;

        let first = store.insert_note("Buy milk", "two bottles")?;
        let second = store.insert_note("Call mom", "sunday")?;
        assert!(first.id >= 1);
        assert!(second.id > first.id);
        assert!(!first.date_time.is_empty());
        // e.g. "09 Jun 2025, 05:30 PM"
        assert_eq!(first.date_time.len(), "09 Jun 2025, 05:30 PM".len());
        Ok(())
    }

    #[test]
    fn all_notes_returns_store_order() -> Result<()> {
        let temp = TempDir::new()?;
        let store = temp_store(&temp)?;
        store.insert_note("first", "a")?;
        store.insert_note("second", "b")?;
        store.insert_note("third", "c")?;

        let notes = store.all_notes()?;
        let titles: Vec<&str> = notes.iter().map(|note| note.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        Ok(())
    }

    #[test]
    fn update_replaces_fields_by_id() -> Result<()> {
        let temp = TempDir::new()?;
        let store = temp_store(&temp)?;
        let note = store.insert_note("draft", "old body")?;

        let mut changed = note.clone();
        changed.title = "final".to_string();
        changed.body = "new body".to_string();
        store.update_note(&changed)?;

        let notes = store.all_notes()?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, note.id);
        assert_eq!(notes[0].title, "final");
        assert_eq!(notes[0].body, "new body");
        Ok(())
    }

    #[test]
    fn delete_is_idempotent() -> Result<()> {
        let temp = TempDir::new()?;
        let store = temp_store(&temp)?;
        let note = store.insert_note("gone", "soon")?;

        store.delete_note(note.id)?;
        store.delete_note(note.id)?; // second delete is a no-op
        assert!(store.all_notes()?.is_empty());
        Ok(())
    }

    #[test]
    fn update_of_missing_note_does_not_fail() -> Result<()> {
        let temp = TempDir::new()?;
        let store = temp_store(&temp)?;
        let ghost = NoteRecord {
            id: 999,
            title: "ghost".to_string(),
            body: "gone".to_string(),
            date_time: String::new(),
        };
        store.update_note(&ghost)?;
        assert!(store.all_notes()?.is_empty());
        Ok(())
    }
}
