use crate::error::AppError;
use crate::notify::{NOTIFICATION_SUMMARY, Notifier, timeout_millis};
use notify_rust::{Notification, Timeout};
use std::time::Duration;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify_error(&self, message: &str, visible_for: Duration) -> Result<(), AppError> {
        Notification::new()
            .summary(NOTIFICATION_SUMMARY)
            .body(message)
            .timeout(Timeout::Milliseconds(timeout_millis(visible_for)))
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
