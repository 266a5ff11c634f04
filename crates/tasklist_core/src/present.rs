//! Display instructions the task list issues to whatever draws it.

use crate::error::AppError;
use crate::model::Task;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Pending,
    Finished,
}

impl Surface {
    /// Picks the surface from the task alone: finished tasks go to the
    /// finished surface, everything else to pending.
    pub fn for_task(task: &Task) -> Self {
        if task.is_finished() {
            Self::Finished
        } else {
            Self::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    None,
    Enter,
    Exit,
}

/// Identifies a rendered row. Rows carry their task's id so activations never
/// have to be resolved from the displayed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowRef {
    pub task_id: String,
    pub text: String,
}

impl RowRef {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            text: task.text.clone(),
        }
    }
}

pub trait Presenter {
    fn render(
        &mut self,
        task: &Task,
        surface: Surface,
        animation: Animation,
    ) -> Result<(), AppError>;

    /// First phase of a removal: start the exit animation. The row stays on
    /// screen until [`Presenter::remove_row`] is called for it.
    fn mark_for_removal(
        &mut self,
        row: &RowRef,
        animation: Animation,
        delay: Duration,
    ) -> Result<(), AppError>;

    fn remove_row(&mut self, row: &RowRef) -> Result<(), AppError>;

    fn show_error(&mut self, message: &str, visible_for: Duration) -> Result<(), AppError>;

    fn clear_error(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn render(
        &mut self,
        _task: &Task,
        _surface: Surface,
        _animation: Animation,
    ) -> Result<(), AppError> {
        Ok(())
    }

    fn mark_for_removal(
        &mut self,
        _row: &RowRef,
        _animation: Animation,
        _delay: Duration,
    ) -> Result<(), AppError> {
        Ok(())
    }

    fn remove_row(&mut self, _row: &RowRef) -> Result<(), AppError> {
        Ok(())
    }

    fn show_error(&mut self, _message: &str, _visible_for: Duration) -> Result<(), AppError> {
        Ok(())
    }
}
