//! Notification contract for task status changes.

use async_trait::async_trait;

use crate::domain::entities::TaskStatus;

/// A status change to report to the responsible person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub to_email: String,
    pub task_id: i64,
    pub task_title: String,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
}

/// Delivers task notifications.
///
/// Delivery failures must not fail the request that triggered them;
/// implementations log and return.
///
/// # Implementations
///
/// - [`crate::infrastructure::notification::LogNotifier`] - writes the message to the log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskNotifier: Send + Sync {
    async fn status_changed(&self, change: StatusChange);
}
