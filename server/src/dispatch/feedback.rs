//! Notification sinks.

use std::sync::Mutex;

use serde::Serialize;

use crate::gateway::NotificationSink;

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// One user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Collects notices so a response can carry them back to the client.
#[derive(Debug, Default)]
pub struct FeedbackCollector {
    notices: Mutex<Vec<Notice>>,
}

impl FeedbackCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(Notice {
                level,
                message: message.to_string(),
            });
        }
    }

    /// Drain everything collected so far.
    #[must_use]
    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }
}

impl NotificationSink for FeedbackCollector {
    fn show_error(&self, message: &str) {
        self.push(NoticeLevel::Error, message);
    }

    fn show_success(&self, message: &str) {
        self.push(NoticeLevel::Success, message);
    }

    fn show_warning(&self, message: &str) {
        self.push(NoticeLevel::Warning, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_keeps_order() {
        let sink = FeedbackCollector::new();
        sink.show_success("first");
        sink.show_error("second");
        sink.show_warning("third");

        let notices = sink.take();
        assert_eq!(notices.len(), 3);
        assert_eq!(notices[2].level, NoticeLevel::Warning);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[1].message, "second");
        assert!(sink.take().is_empty());
    }
}
