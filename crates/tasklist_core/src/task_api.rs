use crate::clock::{Clock, IdSequence, SystemClock};
use crate::error::AppError;
use crate::feedback::{ErrorBanner, TransientError};
use crate::model::{Task, TaskState};
use crate::present::{Animation, Presenter, RowRef, Surface};
use crate::removal::RemovalSchedule;
use crate::storage::KeyValueStore;
use crate::storage::collections::{load_collections, persist_collections};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// How long a row plays its exit animation before it is removed.
    pub removal_delay: Duration,
    /// How long a rejected submission's message stays visible.
    pub error_visible: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            removal_delay: Duration::from_millis(300),
            error_visible: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Finish,
    Delete,
    Repeat,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Finish => "finish",
            Self::Delete => "delete",
            Self::Repeat => "repeat",
        }
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "finish" => Ok(Self::Finish),
            "delete" => Ok(Self::Delete),
            "repeat" => Ok(Self::Repeat),
            other => Err(AppError::invalid_input(format!("unknown action '{other}'"))),
        }
    }
}

/// What an activated row refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    Id(String),
    DisplayText(String),
}

impl From<&RowRef> for ActionTarget {
    fn from(row: &RowRef) -> Self {
        Self::Id(row.task_id.clone())
    }
}

/// Owns the pending and finished tasks and keeps them, the store and the
/// presenter in step.
///
/// Every mutation is applied in memory, written to the store, and only then
/// shown. A failed write restores the previous collections so memory never
/// runs ahead of storage.
pub struct TaskListManager<S, P, C = SystemClock> {
    store: S,
    presenter: P,
    clock: C,
    timings: Timings,
    pending: Vec<Task>,
    finished: Vec<Task>,
    ids: IdSequence,
    removals: RemovalSchedule,
    banner: ErrorBanner,
    legacy_finished: bool,
}

impl<S, P, C> TaskListManager<S, P, C>
where
    S: KeyValueStore,
    P: Presenter,
    C: Clock,
{
    pub fn load(store: S, presenter: P, clock: C, timings: Timings) -> Result<Self, AppError> {
        let collections = load_collections(&store)?;
        let ids = IdSequence::seeded(
            collections
                .pending
                .iter()
                .chain(&collections.finished)
                .map(|task| task.id.as_str()),
        );
        tracing::debug!(
            pending = collections.pending.len(),
            finished = collections.finished.len(),
            "task list loaded"
        );

        Ok(Self {
            store,
            presenter,
            clock,
            timings,
            pending: collections.pending,
            finished: collections.finished,
            ids,
            removals: RemovalSchedule::new(),
            banner: ErrorBanner::new(),
            legacy_finished: collections.legacy_finished,
        })
    }

    /// Draws every loaded task without animation. Pending tasks are issued
    /// oldest first so a presenter that inserts at the top shows the newest
    /// first.
    pub fn render_all(&mut self) {
        for task in &self.pending {
            if let Err(err) = self.presenter.render(task, Surface::Pending, Animation::None) {
                tracing::warn!(id = %task.id, error = %err, "presenter rejected render");
            }
        }
        for task in &self.finished {
            if let Err(err) = self
                .presenter
                .render(task, Surface::Finished, Animation::None)
            {
                tracing::warn!(id = %task.id, error = %err, "presenter rejected render");
            }
        }
    }

    pub fn add_task(&mut self, raw_text: &str) -> Result<Task, AppError> {
        if raw_text.is_empty() {
            return Err(self.reject(AppError::invalid_input("task text is required")));
        }
        if self.contains_text(raw_text) {
            return Err(self.reject(AppError::duplicate(format!(
                "\"{raw_text}\" is already on the list"
            ))));
        }

        let task = Task::create(raw_text, &self.clock, &mut self.ids)?;
        self.pending.push(task.clone());
        if let Err(err) = self.persist() {
            self.pending.pop();
            return Err(err);
        }

        tracing::info!(id = %task.id, "task added");
        self.present("render", |presenter| {
            presenter.render(&task, Surface::Pending, Animation::Enter)
        });
        self.present("clear_input", |presenter| presenter.clear_input());
        Ok(task)
    }

    pub fn locate_by_display_text(&self, text: &str) -> Option<&Task> {
        self.pending
            .iter()
            .chain(&self.finished)
            .find(|task| task.text == text)
    }

    pub fn locate_by_id(&self, id: &str) -> Option<&Task> {
        self.pending
            .iter()
            .chain(&self.finished)
            .find(|task| task.id == id)
    }

    /// Moves a pending task to finished. Returns `Ok(None)` without touching
    /// anything when `id` is not pending.
    pub fn finish_task(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let Some(index) = index_of(&self.pending, id) else {
            tracing::debug!(id, "finish ignored, task is not pending");
            return Ok(None);
        };

        let finished = self.pending[index].clone().finish(&self.clock)?;
        let previous = self.pending.remove(index);
        self.finished.push(finished.clone());
        if let Err(err) = self.persist() {
            self.finished.pop();
            self.pending.insert(index, previous);
            return Err(err);
        }

        tracing::info!(id, "task finished");
        self.mark_row(&previous);
        self.present("render", |presenter| {
            presenter.render(&finished, Surface::Finished, Animation::Enter)
        });
        Ok(Some(finished))
    }

    /// Removes a task from whichever collection holds it. Returns `Ok(None)`
    /// when no task has `id`.
    pub fn delete_task(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let Some((state, index)) = self.position(id) else {
            tracing::debug!(id, "delete ignored, task not found");
            return Ok(None);
        };

        let removed = self.collection_mut(state).remove(index);
        if let Err(err) = self.persist() {
            self.collection_mut(state).insert(index, removed);
            return Err(err);
        }

        tracing::info!(id, from = state.as_str(), "task deleted");
        self.mark_row(&removed);
        Ok(Some(removed))
    }

    /// Moves a finished task back to pending. Returns `Ok(None)` without
    /// touching anything when `id` is not finished.
    pub fn repeat_task(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let Some(index) = index_of(&self.finished, id) else {
            tracing::debug!(id, "repeat ignored, task is not finished");
            return Ok(None);
        };

        let previous = self.finished.remove(index);
        let repeated = previous.clone().repeat();
        self.pending.push(repeated.clone());
        if let Err(err) = self.persist() {
            self.pending.pop();
            self.finished.insert(index, previous);
            return Err(err);
        }

        tracing::info!(id, "task repeated");
        self.mark_row(&previous);
        self.present("render", |presenter| {
            presenter.render(&repeated, Surface::Pending, Animation::Enter)
        });
        Ok(Some(repeated))
    }

    /// Entry point for an activated row control.
    pub fn handle_action(
        &mut self,
        action: Action,
        target: &ActionTarget,
    ) -> Result<Option<Task>, AppError> {
        let id = match target {
            ActionTarget::Id(id) => id.clone(),
            ActionTarget::DisplayText(text) => match self.locate_by_display_text(text) {
                Some(task) => task.id.clone(),
                None => {
                    tracing::debug!(action = action.as_str(), "no task shows this text");
                    return Ok(None);
                }
            },
        };

        match action {
            Action::Finish => self.finish_task(&id),
            Action::Delete => self.delete_task(&id),
            Action::Repeat => self.repeat_task(&id),
        }
    }

    /// Removes rows whose exit animation has run its course. Returns how many
    /// rows were removed.
    pub fn confirm_due_removals(&mut self) -> usize {
        let due = self.removals.take_due(self.clock.now_utc());
        self.confirm_removals(due)
    }

    /// Removes every marked row regardless of its deadline.
    pub fn flush_removals(&mut self) -> usize {
        let rows = self.removals.take_all();
        self.confirm_removals(rows)
    }

    /// Advances deferred work to the clock's current time.
    pub fn tick(&mut self) {
        self.confirm_due_removals();
        if self.banner.expire(self.clock.now_utc()) {
            self.present("clear_error", |presenter| presenter.clear_error());
        }
    }

    pub fn active_error(&self) -> Option<&TransientError> {
        self.banner.active(self.clock.now_utc())
    }

    pub fn marked_rows(&self) -> usize {
        self.removals.len()
    }

    /// Pending tasks in insertion order.
    pub fn pending(&self) -> &[Task] {
        &self.pending
    }

    /// Pending tasks as displayed, most recent first.
    pub fn pending_display_order(&self) -> impl Iterator<Item = &Task> {
        self.pending.iter().rev()
    }

    pub fn finished(&self) -> &[Task] {
        &self.finished
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn contains_text(&self, text: &str) -> bool {
        self.locate_by_display_text(text).is_some()
    }

    fn position(&self, id: &str) -> Option<(TaskState, usize)> {
        index_of(&self.pending, id)
            .map(|index| (TaskState::Pending, index))
            .or_else(|| index_of(&self.finished, id).map(|index| (TaskState::Finished, index)))
    }

    fn collection_mut(&mut self, state: TaskState) -> &mut Vec<Task> {
        match state {
            TaskState::Pending => &mut self.pending,
            TaskState::Finished => &mut self.finished,
        }
    }

    fn persist(&mut self) -> Result<(), AppError> {
        persist_collections(
            &mut self.store,
            &self.pending,
            &self.finished,
            self.legacy_finished,
        )?;
        self.legacy_finished = false;
        Ok(())
    }

    fn reject(&mut self, err: AppError) -> AppError {
        let visible_for = self.timings.error_visible;
        self.banner
            .show(err.code(), err.message(), self.clock.now_utc(), visible_for);
        tracing::debug!(code = err.code(), "submission rejected");
        self.present("show_error", |presenter| {
            presenter.show_error(err.message(), visible_for)
        });
        err
    }

    fn mark_row(&mut self, task: &Task) {
        let row = RowRef::for_task(task);
        let delay = self.timings.removal_delay;
        self.removals.mark(row.clone(), self.clock.now_utc(), delay);
        self.present("mark_for_removal", |presenter| {
            presenter.mark_for_removal(&row, Animation::Exit, delay)
        });
    }

    fn confirm_removals(&mut self, rows: Vec<RowRef>) -> usize {
        for row in &rows {
            self.present("remove_row", |presenter| presenter.remove_row(row));
        }
        rows.len()
    }

    /// Presenter failures are logged and never undo a committed change.
    fn present<F>(&mut self, instruction: &'static str, apply: F)
    where
        F: FnOnce(&mut P) -> Result<(), AppError>,
    {
        if let Err(err) = apply(&mut self.presenter) {
            tracing::warn!(instruction, error = %err, "presenter rejected instruction");
        }
    }
}

fn index_of(tasks: &[Task], id: &str) -> Option<usize> {
    tasks.iter().position(|task| task.id == id)
}
