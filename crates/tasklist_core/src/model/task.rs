use crate::clock::{Clock, IdSequence};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Finished,
}

impl TaskState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Finished => "finished",
        }
    }
}

impl Task {
    pub fn create(
        text: impl Into<String>,
        clock: &impl Clock,
        ids: &mut IdSequence,
    ) -> Result<Self, AppError> {
        let now = clock.now_utc();
        Ok(Self {
            id: ids.next_id(now),
            text: text.into(),
            created_at: format_timestamp(now)?,
            finished_at: None,
        })
    }

    pub fn finish(mut self, clock: &impl Clock) -> Result<Self, AppError> {
        self.finished_at = Some(format_timestamp(clock.now_utc())?);
        Ok(self)
    }

    pub fn repeat(mut self) -> Self {
        self.finished_at = None;
        self
    }

    pub fn state(&self) -> TaskState {
        if self.finished_at.is_some() {
            TaskState::Finished
        } else {
            TaskState::Pending
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == TaskState::Finished
    }
}

fn format_timestamp(instant: OffsetDateTime) -> Result<String, AppError> {
    instant
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
