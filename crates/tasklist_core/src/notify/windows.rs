use crate::error::AppError;
use crate::notify::{NOTIFICATION_SUMMARY, Notifier};
use std::time::Duration;
use tauri_winrt_notification::{Duration as ToastDuration, Toast};

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify_error(&self, message: &str, visible_for: Duration) -> Result<(), AppError> {
        // Toasts only offer two lengths; short is roughly seven seconds.
        let length = if visible_for > Duration::from_secs(7) {
            ToastDuration::Long
        } else {
            ToastDuration::Short
        };

        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(NOTIFICATION_SUMMARY)
            .text1(message)
            .duration(length)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
