use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::list::CollectionStore;
use crate::tasks::{Task, TaskBoard};

const STATE_TMP_EXTENSION: &str = "json.tmp";

/// On-disk shape: the two sequences live under fixed, independently-keyed
/// entries of one JSON document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BoardFile {
    #[serde(rename = "Tasks", default)]
    tasks: Vec<Task>,
    #[serde(rename = "CompletedTasks", default)]
    completed: Vec<Task>,
}

/// Durable store for the task board. Every save is an atomic full overwrite
/// (write a temp file, then rename); there are no incremental patches at
/// this scale.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the board, returning two empty sequences when no state file
    /// exists yet.
    pub fn load(&self) -> Result<TaskBoard> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(TaskBoard::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading task state {}", self.path.display()));
            }
        };
        let file: BoardFile = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing task state {}", self.path.display()))?;
        Ok(TaskBoard {
            active: file.tasks,
            completed: file.completed,
        })
    }

    pub fn save(&self, board: &TaskBoard) -> Result<()> {
        let file = BoardFile {
            tasks: board.active.clone(),
            completed: board.completed.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).context("serialising task state")?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("ensuring task state dir {}", parent.display()))?;
        }
        let tmp_path = self.path.with_extension(STATE_TMP_EXTENSION);
        fs::write(&tmp_path, &json)
            .with_context(|| format!("writing temporary task state {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("atomically persisting task state {}", self.path.display()))?;
        tracing::debug!(
            active = board.active.len(),
            completed = board.completed.len(),
            "task board persisted"
        );
        Ok(())
    }
}

/// `CollectionStore` view over the active partition, for list-controller
/// mutations that touch only active tasks (adding, renaming). The whole
/// board is written, then the in-memory board is committed, so a failed
/// write leaves both in their previous state.
pub struct ActiveRegion<'a> {
    pub board: &'a mut TaskBoard,
    pub store: &'a TaskStore,
}

impl CollectionStore<Task> for ActiveRegion<'_> {
    fn insert(&mut self, item: Task) -> Result<Task> {
        let mut next = self.board.clone();
        next.active.push(item.clone());
        self.store.save(&next)?;
        *self.board = next;
        Ok(item)
    }

    fn remove(&mut self, items: &[Task]) -> Result<()> {
        let mut next = self.board.clone();
        next.active
            .retain(|task| !items.iter().any(|gone| gone.id == task.id));
        self.store.save(&next)?;
        *self.board = next;
        Ok(())
    }

    fn update(&mut self, item: &Task) -> Result<Task> {
        let mut next = self.board.clone();
        for task in &mut next.active {
            if task.id == item.id {
                *task = item.clone();
            }
        }
        self.store.save(&next)?;
        *self.board = next;
        Ok(item.clone())
    }
}
