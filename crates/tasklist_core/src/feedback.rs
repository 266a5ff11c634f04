//! The transient error message shown after a rejected submission.

use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub code: &'static str,
    pub message: String,
    pub expires_at: OffsetDateTime,
}

/// Holds at most one message; showing a new one replaces the current one.
#[derive(Debug, Clone, Default)]
pub struct ErrorBanner {
    current: Option<TransientError>,
}

impl ErrorBanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        code: &'static str,
        message: impl Into<String>,
        now: OffsetDateTime,
        visible_for: Duration,
    ) {
        self.current = Some(TransientError {
            code,
            message: message.into(),
            expires_at: now + visible_for,
        });
    }

    pub fn active(&self, now: OffsetDateTime) -> Option<&TransientError> {
        self.current.as_ref().filter(|error| error.expires_at > now)
    }

    /// Drops the message once it has expired. Returns whether one was dropped.
    pub fn expire(&mut self, now: OffsetDateTime) -> bool {
        match &self.current {
            Some(error) if error.expires_at <= now => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorBanner;
    use std::time::Duration;
    use time::macros::datetime;

    #[test]
    fn message_expires_after_visible_duration() {
        let start = datetime!(2025-12-20 00:00 UTC);
        let mut banner = ErrorBanner::new();
        banner.show("invalid_input", "empty", start, Duration::from_millis(1500));

        assert!(banner.active(start + Duration::from_millis(1499)).is_some());
        assert!(!banner.expire(start + Duration::from_millis(1499)));
        assert!(banner.active(start + Duration::from_millis(1500)).is_none());
        assert!(banner.expire(start + Duration::from_millis(1500)));
        assert!(!banner.expire(start + Duration::from_secs(5)));
    }

    #[test]
    fn new_message_replaces_current() {
        let start = datetime!(2025-12-20 00:00 UTC);
        let mut banner = ErrorBanner::new();
        banner.show("invalid_input", "empty", start, Duration::from_millis(1500));
        banner.show(
            "duplicate",
            "already listed",
            start + Duration::from_millis(1000),
            Duration::from_millis(1500),
        );

        let active = banner.active(start + Duration::from_millis(2000)).unwrap();
        assert_eq!(active.code, "duplicate");
        assert_eq!(active.message, "already listed");
    }
}
