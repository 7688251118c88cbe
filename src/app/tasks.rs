//! Tasks screen: two list regions over one persisted board. Active tasks
//! support search, multi-selection, completion, and deletion; completed
//! tasks are a read-mostly region that only shrinks via deletion.

use anyhow::Result;

use crate::app::ValidationError;
use crate::list::{ListController, SelectionEvent};
use crate::prompt::ConfirmationPrompt;
use crate::tasks::store::ActiveRegion;
use crate::tasks::{Task, TaskBoard, TaskId, TaskStore};

pub const COMPLETE_TASK_TITLE: &str = "Complete Task";
pub const COMPLETE_SELECTED_TITLE: &str = "Completed";
pub const COMPLETE_TASK_MESSAGE: &str = "Did you complete your task?";
pub const DELETE_TASKS_TITLE: &str = "Delete Confirmation";
pub const DELETE_TASKS_MESSAGE: &str = "Are you sure you want to delete these tasks?";

/// Which of the two on-screen lists a gesture landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRegion {
    Active,
    Completed,
}

pub struct TasksScreen {
    store: TaskStore,
    board: TaskBoard,
    active: ListController<Task>,
    done: ListController<Task>,
}

impl TasksScreen {
    pub fn load(store: TaskStore) -> Result<Self> {
        let board = store.load()?;
        let mut screen = Self {
            store,
            board,
            active: ListController::new(),
            done: ListController::new(),
        };
        screen.rebind();
        Ok(screen)
    }

    /// Rebuilds both list regions from the board, dropping any live query
    /// and selection. Called after every structural change so the regions
    /// track the partitions.
    fn rebind(&mut self) {
        self.active.bind(self.board.active.clone());
        self.done.bind(self.board.completed.clone());
    }

    pub fn reload(&mut self) -> Result<()> {
        self.board = self.store.load()?;
        self.rebind();
        Ok(())
    }

    pub fn active_rows(&self) -> &[Task] {
        self.active.displayed()
    }

    pub fn completed_rows(&self) -> &[Task] {
        self.done.displayed()
    }

    /// The completed section is shown only while it has entries.
    pub fn completed_section_visible(&self) -> bool {
        !self.board.completed.is_empty()
    }

    pub fn is_multi_select(&self) -> bool {
        self.active.is_multi_select() || self.done.is_multi_select()
    }

    pub fn selection_count(&self) -> usize {
        self.active.selection().count() + self.done.selection().count()
    }

    /// Selected tasks across both regions, active ones first.
    pub fn selected_tasks(&self) -> Vec<Task> {
        let mut selected = self.active.selected_items();
        selected.extend(self.done.selected_items());
        selected
    }

    /// The batch "mark complete" action is offered only while every selected
    /// task is still active; completion is one-way, so a selection touching
    /// the completed region hides it.
    pub fn complete_action_visible(&self) -> bool {
        self.is_multi_select()
            && !self.active.any_selected_satisfies(|task| task.completed)
            && !self.done.any_selected_satisfies(|task| task.completed)
    }

    /// Appends a new active task. The title must be non-blank.
    pub fn add_task(&mut self, title: &str) -> Result<Task> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTaskTitle.into());
        }
        let mut region = ActiveRegion {
            board: &mut self.board,
            store: &self.store,
        };
        self.active.add(&mut region, Task::new(title))
    }

    /// Filters the active region. The completed region is not searched.
    pub fn search(&mut self, query: &str) -> bool {
        self.active.set_query(query)
    }

    /// Long-press gesture: enters multi-select seeded with the pressed task.
    pub fn long_press(&mut self, region: TaskRegion, id: TaskId) -> Option<SelectionEvent> {
        self.controller_mut(region).enter_multi_select(id)
    }

    /// Tap gesture: toggles membership while selecting, otherwise nothing at
    /// this level.
    pub fn tap(&mut self, region: TaskRegion, id: TaskId) -> Option<SelectionEvent> {
        if !self.is_multi_select() {
            return None;
        }
        self.extend_selection(region, id)
    }

    /// Toggles membership within `region`. A selection started in one region
    /// crosses into the other via that region's own selection entry, since
    /// each region tracks its selection independently.
    fn extend_selection(&mut self, region: TaskRegion, id: TaskId) -> Option<SelectionEvent> {
        let controller = self.controller_mut(region);
        if controller.is_multi_select() {
            controller.toggle_selection(id)
        } else {
            controller.enter_multi_select(id)
        }
    }

    /// Checkbox gesture. While selecting it acts as a plain tap; otherwise
    /// tapping an active task's checkbox asks for confirmation and completes
    /// it. Completed tasks' checkboxes are inert. Returns whether a task was
    /// completed.
    pub fn checkbox_tap(
        &mut self,
        prompt: &mut dyn ConfirmationPrompt,
        region: TaskRegion,
        id: TaskId,
    ) -> Result<bool> {
        if self.is_multi_select() {
            self.extend_selection(region, id);
            return Ok(false);
        }
        if region != TaskRegion::Active {
            return Ok(false);
        }
        if !prompt
            .ask(COMPLETE_TASK_TITLE, COMPLETE_TASK_MESSAGE)?
            .confirmed()
        {
            return Ok(false);
        }
        self.complete_task(id)
    }

    /// Moves one active task to the completed partition, persisting the
    /// whole board first. Returns false when the task is no longer active.
    pub fn complete_task(&mut self, id: TaskId) -> Result<bool> {
        let mut next = self.board.clone();
        if !next.complete(id) {
            return Ok(false);
        }
        self.store.save(&next)?;
        self.board = next;
        self.rebind();
        Ok(true)
    }

    /// Batch-completes the selected tasks after confirmation. Selected tasks
    /// that are already completed are skipped. One persisted write covers
    /// the whole batch; returns how many tasks moved.
    pub fn complete_selected(&mut self, prompt: &mut dyn ConfirmationPrompt) -> Result<usize> {
        let ids: Vec<TaskId> = self.selected_tasks().iter().map(|task| task.id).collect();
        if ids.is_empty() {
            return Ok(0);
        }
        if !prompt
            .ask(COMPLETE_SELECTED_TITLE, COMPLETE_TASK_MESSAGE)?
            .confirmed()
        {
            return Ok(0);
        }

        let mut next = self.board.clone();
        let moved = ids.iter().filter(|id| next.complete(**id)).count();
        if moved == 0 {
            return Ok(0);
        }
        self.store.save(&next)?;
        self.board = next;
        self.rebind();
        Ok(moved)
    }

    /// Batch-deletes the selected tasks from both partitions after
    /// confirmation, with one persisted write. Returns how many were
    /// removed.
    pub fn delete_selected(&mut self, prompt: &mut dyn ConfirmationPrompt) -> Result<usize> {
        let ids: Vec<TaskId> = self.selected_tasks().iter().map(|task| task.id).collect();
        if ids.is_empty() {
            return Ok(0);
        }
        if !prompt
            .ask(DELETE_TASKS_TITLE, DELETE_TASKS_MESSAGE)?
            .confirmed()
        {
            return Ok(0);
        }

        let mut next = self.board.clone();
        let removed = next.remove(&ids);
        if removed == 0 {
            return Ok(0);
        }
        self.store.save(&next)?;
        self.board = next;
        self.rebind();
        Ok(removed)
    }

    pub fn clear_selection(&mut self) -> Option<SelectionEvent> {
        let active = self.active.clear_selection();
        let done = self.done.clear_selection();
        if active.is_some() || done.is_some() {
            return Some(SelectionEvent { count: 0 });
        }
        None
    }

    fn controller_mut(&mut self, region: TaskRegion) -> &mut ListController<Task> {
        match region {
            TaskRegion::Active => &mut self.active,
            TaskRegion::Completed => &mut self.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::prompt::{PromptOutcome, ScriptedPrompt};

    fn screen(root: &TempDir) -> Result<TasksScreen> {
        let store = TaskStore::new(root.path().join("tasks.json"));
        TasksScreen::load(store)
    }

    fn confirm() -> ScriptedPrompt {
        ScriptedPrompt::replying([PromptOutcome::Confirmed])
    }

    #[test]
    fn blank_title_is_rejected() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let err = screen.add_task("   ").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptyTaskTitle)
        );
        assert!(screen.active_rows().is_empty());
        Ok(())
    }

    #[test]
    fn added_tasks_are_persisted_immediately() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        screen.add_task("Buy milk")?;
        screen.add_task("Call mom")?;

        let store = TaskStore::new(temp.path().join("tasks.json"));
        let board = store.load()?;
        assert_eq!(board.active.len(), 2);
        assert!(board.completed.is_empty());
        Ok(())
    }

    #[test]
    fn completing_a_task_moves_it_on_screen_and_on_disk() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let task = screen.add_task("Water plants")?;
        assert!(!screen.completed_section_visible());

        assert!(screen.complete_task(task.id)?);
        assert!(screen.active_rows().is_empty());
        assert_eq!(screen.completed_rows().len(), 1);
        assert!(screen.completed_rows()[0].completed);
        assert!(screen.completed_section_visible());

        let board = TaskStore::new(temp.path().join("tasks.json")).load()?;
        assert!(board.active.is_empty());
        assert_eq!(board.completed.len(), 1);
        assert_eq!(board.completed[0].title, "Water plants");
        Ok(())
    }

    #[test]
    fn completion_is_one_way() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let task = screen.add_task("A")?;
        assert!(screen.complete_task(task.id)?);
        assert!(!screen.complete_task(task.id)?);
        assert_eq!(screen.completed_rows().len(), 1);
        Ok(())
    }

    #[test]
    fn checkbox_outside_multi_select_asks_before_completing() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let task = screen.add_task("A")?;

        let mut declined =
            ScriptedPrompt::replying([PromptOutcome::Declined, PromptOutcome::Dismissed]);
        assert!(!screen.checkbox_tap(&mut declined, TaskRegion::Active, task.id)?);
        assert!(!screen.checkbox_tap(&mut declined, TaskRegion::Active, task.id)?);
        assert_eq!(screen.active_rows().len(), 1);
        assert_eq!(
            declined.asked[0],
            (
                COMPLETE_TASK_TITLE.to_string(),
                COMPLETE_TASK_MESSAGE.to_string()
            )
        );

        let mut prompt = confirm();
        assert!(screen.checkbox_tap(&mut prompt, TaskRegion::Active, task.id)?);
        assert!(screen.active_rows().is_empty());
        Ok(())
    }

    #[test]
    fn checkbox_in_multi_select_toggles_instead() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let first = screen.add_task("A")?;
        let second = screen.add_task("B")?;

        screen.long_press(TaskRegion::Active, first.id);
        let mut prompt = ScriptedPrompt::default();
        assert!(!screen.checkbox_tap(&mut prompt, TaskRegion::Active, second.id)?);
        assert!(prompt.asked.is_empty());
        assert_eq!(screen.selection_count(), 2);
        assert_eq!(screen.active_rows().len(), 2);
        Ok(())
    }

    #[test]
    fn completed_checkbox_is_inert() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let task = screen.add_task("A")?;
        screen.complete_task(task.id)?;
        let done_id = screen.completed_rows()[0].id;

        let mut prompt = ScriptedPrompt::default();
        assert!(!screen.checkbox_tap(&mut prompt, TaskRegion::Completed, done_id)?);
        assert!(prompt.asked.is_empty());
        Ok(())
    }

    #[test]
    fn batch_completion_moves_every_selected_task_with_one_prompt() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let first = screen.add_task("A")?;
        let second = screen.add_task("B")?;
        screen.add_task("C")?;

        screen.long_press(TaskRegion::Active, first.id);
        screen.tap(TaskRegion::Active, second.id);

        let mut prompt = confirm();
        assert_eq!(screen.complete_selected(&mut prompt)?, 2);
        assert_eq!(prompt.asked.len(), 1);
        assert_eq!(
            prompt.asked[0],
            (
                COMPLETE_SELECTED_TITLE.to_string(),
                COMPLETE_TASK_MESSAGE.to_string()
            )
        );

        // Selection dissolves with the rebind and the board is persisted.
        assert!(!screen.is_multi_select());
        assert_eq!(screen.active_rows().len(), 1);
        assert_eq!(screen.completed_rows().len(), 2);
        let board = TaskStore::new(temp.path().join("tasks.json")).load()?;
        assert_eq!(board.active.len(), 1);
        assert_eq!(board.completed.len(), 2);
        Ok(())
    }

    #[test]
    fn declined_batch_completion_changes_nothing() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let task = screen.add_task("A")?;
        screen.long_press(TaskRegion::Active, task.id);

        let mut prompt = ScriptedPrompt::replying([PromptOutcome::Declined]);
        assert_eq!(screen.complete_selected(&mut prompt)?, 0);
        assert_eq!(screen.active_rows().len(), 1);
        assert!(screen.is_multi_select());
        Ok(())
    }

    #[test]
    fn complete_action_hides_when_a_completed_task_is_selected() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let first = screen.add_task("A")?;
        let second = screen.add_task("B")?;
        screen.complete_task(first.id)?;
        let done_id = screen.completed_rows()[0].id;

        screen.long_press(TaskRegion::Active, second.id);
        assert!(screen.complete_action_visible());

        screen.tap(TaskRegion::Completed, done_id);
        assert!(!screen.complete_action_visible());
        Ok(())
    }

    #[test]
    fn tap_extends_the_selection_into_the_other_region() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let first = screen.add_task("A")?;
        let second = screen.add_task("B")?;
        screen.complete_task(first.id)?;
        let done_id = screen.completed_rows()[0].id;

        screen.long_press(TaskRegion::Active, second.id);
        let event = screen.tap(TaskRegion::Completed, done_id);
        assert_ne!(event, None);
        assert_eq!(screen.selection_count(), 2);
        assert!(screen
            .selected_tasks()
            .iter()
            .any(|task| task.id == done_id));

        // Tapping it again deselects it, leaving the original selection.
        screen.tap(TaskRegion::Completed, done_id);
        assert_eq!(screen.selection_count(), 1);
        assert!(screen.is_multi_select());
        Ok(())
    }

    #[test]
    fn batch_delete_spans_both_partitions() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let first = screen.add_task("A")?;
        screen.add_task("B")?;
        screen.complete_task(first.id)?;
        let done_id = screen.completed_rows()[0].id;
        let active_id = screen.active_rows()[0].id;

        screen.long_press(TaskRegion::Active, active_id);
        screen.tap(TaskRegion::Completed, done_id);

        let mut prompt = confirm();
        assert_eq!(screen.delete_selected(&mut prompt)?, 2);
        assert_eq!(
            prompt.asked[0],
            (
                DELETE_TASKS_TITLE.to_string(),
                DELETE_TASKS_MESSAGE.to_string()
            )
        );
        assert!(screen.active_rows().is_empty());
        assert!(screen.completed_rows().is_empty());
        assert!(TaskStore::new(temp.path().join("tasks.json")).load()?.is_empty());
        Ok(())
    }

    #[test]
    fn search_filters_only_the_active_region() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let first = screen.add_task("Buy milk")?;
        screen.add_task("Call mom")?;
        screen.complete_task(first.id)?;

        assert!(!screen.search("milk"));
        assert!(screen.active_rows().is_empty());
        assert_eq!(screen.completed_rows().len(), 1);

        assert!(screen.search("call"));
        assert_eq!(screen.active_rows().len(), 1);
        Ok(())
    }

    #[test]
    fn clear_selection_emits_only_on_change() -> Result<()> {
        let temp = TempDir::new()?;
        let mut screen = screen(&temp)?;
        let task = screen.add_task("A")?;

        assert_eq!(screen.clear_selection(), None);
        screen.long_press(TaskRegion::Active, task.id);
        assert_eq!(screen.clear_selection(), Some(SelectionEvent { count: 0 }));
        assert_eq!(screen.clear_selection(), None);
        Ok(())
    }
}
