//! DTOs for task endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::api::dto::pagination::PaginationParams;
use crate::application::services::{CreateTask, ListTasks, TaskPage};
use crate::domain::entities::{Task, TaskPatch, TaskStatus};

/// Request body for `POST /tasks`.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskCreateRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[validate(length(max = 500))]
    #[serde(default)]
    pub description: Option<String>,

    #[validate(range(min = 0, max = 3))]
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub responsible_person_id: Option<i64>,

    #[serde(default)]
    pub executor_ids: Vec<i64>,
}

impl From<TaskCreateRequest> for CreateTask {
    fn from(req: TaskCreateRequest) -> Self {
        CreateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            responsible_person_id: req.responsible_person_id,
            executor_ids: req.executor_ids,
        }
    }
}

/// Request body for `PUT /tasks/{id}`.
///
/// All fields are optional; only provided fields are changed.
///
/// # `description` semantics
///
/// - **Absent** → leave unchanged
/// - **`null`** → clear
/// - **String** → set
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct TaskUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,

    #[validate(length(max = 500))]
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,

    #[validate(range(min = 0, max = 3))]
    pub priority: Option<i32>,

    pub status: Option<TaskStatus>,

    /// Replaces the executor set when present.
    pub executor_ids: Option<Vec<i64>>,
}

impl From<TaskUpdateRequest> for TaskPatch {
    fn from(req: TaskUpdateRequest) -> Self {
        TaskPatch {
            title: req.title,
            description: req.description,
            priority: req.priority,
            status: req.status,
            executor_ids: req.executor_ids,
        }
    }
}

/// Query parameters for `GET /tasks`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub priority: Option<i32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub responsible_person_id: Option<i64>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl From<TaskListQuery> for ListTasks {
    fn from(query: TaskListQuery) -> Self {
        let (page, page_size) = query.pagination.resolve();
        ListTasks {
            status: query.status,
            priority: query.priority,
            responsible_person_id: query.responsible_person_id,
            page,
            page_size,
        }
    }
}

/// JSON representation of a task.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
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

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            responsible_person_id: task.responsible_person_id,
            executor_ids: task.executor_ids,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Response body for `GET /tasks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl From<TaskPage> for TaskListResponse {
    fn from(page: TaskPage) -> Self {
        Self {
            tasks: page.tasks.into_iter().map(TaskResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}
