//! Logging notifier standing in for an e-mail gateway.

use async_trait::async_trait;
use tracing::info;

use crate::domain::notifier::{StatusChange, TaskNotifier};

/// A notifier that records each message in the log.
///
/// No mail is sent. Every call succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TaskNotifier for LogNotifier {
    async fn status_changed(&self, change: StatusChange) {
        info!(
            to = %change.to_email,
            task_id = change.task_id,
            task_title = %change.task_title,
            old_status = %change.old_status,
            new_status = %change.new_status,
            "Task status change e-mail (mock): '{}' moved from '{}' to '{}'",
            change.task_title,
            change.old_status,
            change.new_status
        );
        metrics::counter!("task_status_notifications_total").increment(1);
    }
}
