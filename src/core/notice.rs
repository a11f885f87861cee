//! Notification collaborator seam.
//!
//! The engine never prints or renders; anything a host surface should show
//! outside the transcript (configuration problems, authentication failures,
//! degraded snapshots) is handed to a [`Notices`] implementation as a
//! categorized, human-readable notice.

use std::sync::Mutex;

/// Severity for notices routed to the host surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }
}

/// A categorized message for the host surface. `category` is a short
/// human-readable label ("Configuration", "Authentication", ...), never a
/// raw error or stack trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub category: String,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            category: category.into(),
            message: message.into(),
        }
    }

    pub fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, category, message)
    }

    pub fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, category, message)
    }
}

/// Collaborator that delivers notices to whatever surface hosts the engine.
pub trait Notices: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Discards every notice. For hosts that surface problems elsewhere.
pub struct NullNotices;

impl Notices for NullNotices {
    fn notify(&self, _notice: Notice) {}
}

/// Collects notices in memory; the double used throughout the test suite.
#[derive(Default)]
pub struct NoticeLog {
    entries: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notice> {
        self.entries.lock().expect("notice log poisoned").clone()
    }
}

impl Notices for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.entries.lock().expect("notice log poisoned").push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_log_records_in_order() {
        let log = NoticeLog::new();
        log.notify(Notice::warning("Configuration", "public key missing"));
        log.notify(Notice::error("Authentication", "credential expired"));

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, NoticeKind::Warning);
        assert_eq!(entries[0].category, "Configuration");
        assert_eq!(entries[1].kind, NoticeKind::Error);
    }

    #[test]
    fn kinds_have_stable_labels() {
        assert_eq!(NoticeKind::Info.as_str(), "info");
        assert_eq!(NoticeKind::Warning.as_str(), "warning");
        assert_eq!(NoticeKind::Error.as_str(), "error");
    }
}
