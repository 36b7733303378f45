//! Best-effort announcements of timetable lifecycle events

use log::info;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    TimetablePublished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub timetable_id: Uuid,
    pub class_label: String,
    pub actor_id: String,
}

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Where lifecycle events go.
///
/// Implementations must return promptly. Failures are logged by the caller
/// and never undo the operation that raised the event.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes every notification to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            "{:?}: timetable {} ({}) by {}",
            notification.kind,
            notification.timetable_id,
            notification.class_label,
            notification.actor_id
        );
        Ok(())
    }
}
