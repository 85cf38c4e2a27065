//! Task entity, status and query inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest accepted task priority.
pub const MIN_PRIORITY: i32 = 0;
/// Highest accepted task priority.
pub const MAX_PRIORITY: i32 = 3;

/// Progress state of a task.
///
/// JSON values are `"TODO"`, `"In progress"` and `"Done"`; the database
/// enum uses `TODO`, `IN_PROGRESS` and `DONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// Name of the variant in the `task_status` database enum.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    /// Parses the database enum name.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(TaskStatus::Todo),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Label shown to users and in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Accepts both the wire label and the database name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "In progress" | "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "Done" | "DONE" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status '{}'", other)),
        }
    }
}

/// A task with its executor set.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub status: TaskStatus,
    pub responsible_person_id: i64,
    pub executor_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Returns true if `user_id` is one of the task's executors.
    pub fn has_executor(&self, user_id: i64) -> bool {
        self.executor_ids.contains(&user_id)
    }

    /// Returns true if `user_id` is responsible for or executes the task.
    pub fn involves(&self, user_id: i64) -> bool {
        self.responsible_person_id == user_id || self.has_executor(user_id)
    }
}

/// Input data for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub status: TaskStatus,
    pub responsible_person_id: i64,
    pub executor_ids: Vec<i64>,
}

/// Partial update for an existing task.
///
/// `None` fields are left unchanged. `description: Some(None)` clears it.
/// `executor_ids: Some(ids)` replaces the whole executor set.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<i32>,
    pub status: Option<TaskStatus>,
    pub executor_ids: Option<Vec<i64>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.executor_ids.is_none()
    }
}

/// Filters for task listing.
///
/// `visible_to` restricts results to tasks the given user is responsible for
/// or executes; it is set for non-admin callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<i32>,
    pub responsible_person_id: Option<i64>,
    pub visible_to: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(responsible: i64, executors: Vec<i64>) -> Task {
        Task {
            id: 1,
            title: "Write report".to_string(),
            description: None,
            priority: 1,
            status: TaskStatus::Todo,
            responsible_person_id: responsible,
            executor_ids: executors,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"In progress\""
        );
        let parsed: TaskStatus = serde_json::from_str("\"Done\"").unwrap();
        assert_eq!(parsed, TaskStatus::Done);
        assert!(serde_json::from_str::<TaskStatus>("\"DONE\"").is_err());
    }

    #[test]
    fn test_status_db_names() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(TaskStatus::from_db_str(status.as_db_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_db_str("In progress"), None);
    }

    #[test]
    fn test_status_from_str_accepts_both_forms() {
        assert_eq!("In progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("started".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_default_status_is_todo() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
    }

    #[test]
    fn test_involves() {
        let t = task(1, vec![2, 3]);
        assert!(t.involves(1));
        assert!(t.involves(3));
        assert!(!t.involves(4));
        assert!(t.has_executor(2));
        assert!(!t.has_executor(1));
    }

    #[test]
    fn test_empty_patch() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            priority: Some(2),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
