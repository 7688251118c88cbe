//! Checklist task model: tasks live in one of two partitions (active or
//! completed) and move between them exactly once, active to completed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::list::ListItem;

pub mod store;

pub use store::TaskStore;

/// Stable synthetic identity for a task, independent of its title. Titles
/// are display data and may legitimately collide; ids never do. Ids are not
/// persisted — the wire format is title/completed/group — so every load
/// mints fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(skip_serializing, skip_deserializing, default = "TaskId::generate")]
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            title: title.into(),
            completed: false,
            group: None,
        }
    }
}

impl ListItem for Task {
    type Key = TaskId;

    fn key(&self) -> TaskId {
        self.id
    }

    fn search_title(&self) -> &str {
        &self.title
    }
}

/// The two task partitions, serialized and restored as a unit. A task id
/// appears in at most one partition at any time.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskBoard {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.active
            .iter()
            .chain(self.completed.iter())
            .find(|task| task.id == id)
    }

    /// Moves the active task with `id` into the completed partition,
    /// marking it completed. Returns false when no such active task exists
    /// (already completed, or deleted by a racing gesture).
    pub fn complete(&mut self, id: TaskId) -> bool {
        let Some(position) = self.active.iter().position(|task| task.id == id) else {
            return false;
        };
        let mut task = self.active.remove(position);
        task.completed = true;
        self.completed.push(task);
        true
    }

    /// Removes the tasks with the given ids from both partitions. Returns
    /// the number removed.
    pub fn remove(&mut self, ids: &[TaskId]) -> usize {
        let before = self.active.len() + self.completed.len();
        self.active.retain(|task| !ids.contains(&task.id));
        self.completed.retain(|task| !ids.contains(&task.id));
        before - self.active.len() - self.completed.len()
    }
}
