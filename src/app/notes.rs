//! Notes screen: a searchable list of stored notes with create, edit, and
//! confirmed delete.

use std::time::Instant;

use anyhow::Result;

use crate::app::ValidationError;
use crate::list::{ListController, NoticeTimer};
use crate::prompt::ConfirmationPrompt;
use crate::storage::{NoteRecord, NoteStore};

pub const DELETE_NOTE_TITLE: &str = "Delete Note";
pub const DELETE_NOTE_MESSAGE: &str = "Are you sure you want to delete this note?";
pub const NO_MATCH_MESSAGE: &str = "Searched note is not present";

pub struct NotesScreen {
    store: NoteStore,
    list: ListController<NoteRecord>,
    notifier: NoticeTimer,
    last_has_match: bool,
}

impl NotesScreen {
    pub fn load(store: NoteStore, notifier: NoticeTimer) -> Result<Self> {
        let mut screen = Self {
            store,
            list: ListController::new(),
            notifier,
            last_has_match: true,
        };
        screen.reload()?;
        Ok(screen)
    }

    /// Re-reads the full collection from the store, dropping any live query
    /// and selection.
    pub fn reload(&mut self) -> Result<()> {
        let notes = self.store.all_notes()?;
        self.list.bind(notes);
        self.last_has_match = true;
        self.notifier.cancel();
        Ok(())
    }

    /// Notes currently visible under the live query.
    pub fn rows(&self) -> &[NoteRecord] {
        self.list.displayed()
    }

    pub fn query(&self) -> &str {
        self.list.query()
    }

    /// Creates a note, or replaces the one with id `existing`. Both fields
    /// must be non-blank.
    pub fn save_note(
        &mut self,
        title: &str,
        body: &str,
        existing: Option<i64>,
    ) -> Result<NoteRecord> {
        if title.trim().is_empty() || body.trim().is_empty() {
            return Err(ValidationError::EmptyNoteFields.into());
        }
        match existing {
            None => {
                let mut store = self.store.clone();
                self.list.add(&mut store, NoteRecord::draft(title, body))
            }
            Some(id) => {
                let mut record = NoteRecord::draft(title, body);
                record.id = id;
                let mut store = self.store.clone();
                // The store refreshes the timestamp; the stored form flows
                // back into the bound sequences without disturbing the live
                // query or selection.
                match self.list.update_item(&mut store, record.clone())? {
                    Some(stored) => Ok(stored),
                    None => Ok(record),
                }
            }
        }
    }

    /// Deletes one note after confirmation. Returns whether the note was
    /// actually removed; declining or dismissing the prompt removes nothing.
    pub fn delete_note(
        &mut self,
        prompt: &mut dyn ConfirmationPrompt,
        id: i64,
    ) -> Result<bool> {
        if !prompt.ask(DELETE_NOTE_TITLE, DELETE_NOTE_MESSAGE)?.confirmed() {
            return Ok(false);
        }
        let mut store = self.store.clone();
        let (removed, _) = self.list.remove(&mut store, &[id])?;
        Ok(removed > 0)
    }

    /// Applies `query` to the list and (re)arms the no-result notification.
    /// Returns whether anything matched.
    pub fn search(&mut self, query: &str, now: Instant) -> bool {
        self.last_has_match = self.list.set_query(query);
        self.notifier.schedule(now);
        self.last_has_match
    }

    /// Fires the debounced "no results" notice once the delay has elapsed
    /// since the last query change, and only when that query matched
    /// nothing.
    pub fn poll_notice(&mut self, now: Instant) -> Option<&'static str> {
        self.notifier.poll(now)?;
        if self.last_has_match {
            return None;
        }
        Some(NO_MATCH_MESSAGE)
    }
}
