//! Screen-level orchestration: one module per screen, each owning its store
//! handle, list controller(s), and the notifications it raises.

use thiserror::Error;

pub mod notes;
pub mod tasks;

pub use notes::NotesScreen;
pub use tasks::{TaskRegion, TasksScreen};

/// Input validation failures surfaced verbatim to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title and Description can't be empty!")]
    EmptyNoteFields,
    #[error("Task title cannot be empty")]
    EmptyTaskTitle,
}
