pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod model;
pub mod notify;
pub mod present;
pub mod removal;
pub mod storage;
pub mod task_api;

pub use task_api::{Action, ActionTarget, TaskListManager, Timings};

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Task, TaskState};

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: "0000000001".to_string(),
            text: "demo".to_string(),
            created_at: "2025-12-20T00:00:00Z".to_string(),
            finished_at: None,
        };

        assert_eq!(task.id, "0000000001");
        assert_eq!(task.text, "demo");
        assert_eq!(task.created_at, "2025-12-20T00:00:00Z");
        assert_eq!(task.finished_at, None);
        assert_eq!(task.state(), TaskState::Pending);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::duplicate("already listed");
        assert_eq!(err.code(), "duplicate");
        assert!(err.is_validation());
        assert!(!AppError::io("disk full").is_validation());
        assert_eq!(err.to_string(), "duplicate - already listed");
    }
}
