//! Desktop delivery of transient error messages.

use crate::error::AppError;
use std::time::Duration;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

pub const NOTIFICATION_SUMMARY: &str = "tasklist";

pub trait Notifier {
    fn notify_error(&self, message: &str, visible_for: Duration) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_error(&self, _message: &str, _visible_for: Duration) -> Result<(), AppError> {
        Ok(())
    }
}

/// Returns the platform notifier when `enabled`, falling back to a no-op on
/// platforms without one.
pub fn notifier_for(enabled: bool) -> Box<dyn Notifier> {
    if !enabled || std::env::var("TASKLIST_DISABLE_NOTIFICATIONS").is_ok() {
        return Box::new(NoopNotifier);
    }

    match platform_notifier() {
        Ok(notifier) => notifier,
        Err(err) => {
            tracing::debug!(error = %err, "desktop notifications unavailable");
            Box::new(NoopNotifier)
        }
    }
}

/// Notification timeouts are expressed in whole milliseconds.
pub fn timeout_millis(visible_for: Duration) -> u32 {
    u32::try_from(visible_for.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::{notifier_for, timeout_millis};
    use std::time::Duration;

    #[test]
    fn disabled_notifier_accepts_messages() {
        let notifier = notifier_for(false);
        assert!(
            notifier
                .notify_error("task text is required", Duration::from_millis(1500))
                .is_ok()
        );
    }

    #[test]
    fn timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX)), u32::MAX);
    }
}
