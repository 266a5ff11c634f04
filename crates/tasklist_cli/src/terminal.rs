//! Terminal rendering of the task list.

use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::config::Palette;
use tasklist_core::error::AppError;
use tasklist_core::model::Task;
use tasklist_core::notify::Notifier;
use tasklist_core::present::{Animation, Presenter, RowRef, Surface};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Presenter for the terminal. With `echo_rows` every instruction is printed
/// as a line; without it only errors are forwarded to the desktop notifier and
/// the caller prints its own summary.
pub struct TerminalPresenter {
    palette: Palette,
    notifier: Box<dyn Notifier>,
    echo_rows: bool,
    last_error: Option<String>,
}

impl TerminalPresenter {
    pub fn new(palette: Palette, notifier: Box<dyn Notifier>, echo_rows: bool) -> Self {
        Self {
            palette,
            notifier,
            echo_rows,
            last_error: None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn row_line(&self, task: &Task, surface: Surface) -> String {
        let (checkbox, text) = match surface {
            Surface::Pending => ("[ ]", task.text.clone()),
            Surface::Finished => ("[x]", self.palette.strike(&task.text)),
        };
        format!("{checkbox} {text} ({})", self.palette.accentize(&task.id))
    }
}

impl Presenter for TerminalPresenter {
    fn render(
        &mut self,
        task: &Task,
        surface: Surface,
        animation: Animation,
    ) -> Result<(), AppError> {
        if self.echo_rows {
            let marker = match animation {
                Animation::Enter => "+",
                Animation::Exit => "-",
                Animation::None => " ",
            };
            println!("{marker} {}", self.row_line(task, surface));
        }
        Ok(())
    }

    fn mark_for_removal(
        &mut self,
        row: &RowRef,
        _animation: Animation,
        _delay: Duration,
    ) -> Result<(), AppError> {
        if self.echo_rows {
            println!("~ {}", self.palette.mutedize(&row.text));
        }
        Ok(())
    }

    fn remove_row(&mut self, row: &RowRef) -> Result<(), AppError> {
        if self.echo_rows {
            println!(
                "- {} ({})",
                self.palette.mutedize(&row.text),
                row.task_id
            );
        }
        Ok(())
    }

    fn show_error(&mut self, message: &str, visible_for: Duration) -> Result<(), AppError> {
        self.last_error = Some(message.to_string());
        self.notifier.notify_error(message, visible_for)
    }

    fn clear_error(&mut self) -> Result<(), AppError> {
        self.last_error = None;
        Ok(())
    }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "state")]
    state: &'static str,
    #[tabled(rename = "text")]
    text: String,
    #[tabled(rename = "created")]
    created: String,
    #[tabled(rename = "finished")]
    finished: String,
}

impl TaskRow {
    fn from_task(task: &Task, offset: UtcOffset) -> Self {
        Self {
            id: task.id.clone(),
            state: task.state().as_str(),
            text: task.text.clone(),
            created: display_timestamp(&task.created_at, offset),
            finished: task
                .finished_at
                .as_deref()
                .map(|value| display_timestamp(value, offset))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Pending tasks newest first, then finished tasks in the order they were
/// finished.
pub fn task_table<'a>(
    pending: impl Iterator<Item = &'a Task>,
    finished: &'a [Task],
) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let rows: Vec<TaskRow> = pending
        .chain(finished)
        .map(|task| TaskRow::from_task(task, offset))
        .collect();
    if rows.is_empty() {
        return "No tasks.".to_string();
    }

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

pub fn display_timestamp(value: &str, offset: UtcOffset) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::parse(value, &Rfc3339)
        .ok()
        .and_then(|instant| instant.to_offset(offset).format(format).ok())
        .unwrap_or_else(|| value.to_string())
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "state": task.state().as_str(),
        "createdAt": task.created_at,
        "finishedAt": task.finished_at,
    })
}
