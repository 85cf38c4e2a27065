//! Task management with role-based access.

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::{
    MAX_PRIORITY, MIN_PRIORITY, NewTask, Task, TaskFilter, TaskPatch, TaskStatus,
};
use crate::domain::notifier::{StatusChange, TaskNotifier};
use crate::domain::permissions::{self, Principal};
use crate::domain::repositories::{TaskRepository, UserRepository};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Task creation input. `responsible_person_id` defaults to the caller.
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub status: TaskStatus,
    pub responsible_person_id: Option<i64>,
    pub executor_ids: Vec<i64>,
}

/// Listing filters plus 1-based pagination.
#[derive(Debug, Clone)]
pub struct ListTasks {
    pub status: Option<TaskStatus>,
    pub priority: Option<i32>,
    pub responsible_person_id: Option<i64>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListTasks {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            responsible_person_id: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of tasks.
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

fn validate_priority(priority: i32) -> Result<(), AppError> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Ok(());
    }
    Err(AppError::bad_request(
        format!("Priority must be between {} and {}", MIN_PRIORITY, MAX_PRIORITY),
        json!({ "priority": priority }),
    ))
}

fn validate_page(page: u32, page_size: u32) -> Result<(), AppError> {
    if page < 1 {
        return Err(AppError::bad_request(
            "Page must be at least 1",
            json!({ "page": page }),
        ));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(AppError::bad_request(
            format!("Page size must be between 1 and {}", MAX_PAGE_SIZE),
            json!({ "page_size": page_size }),
        ));
    }
    Ok(())
}

fn dedup(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn task_not_found(id: i64) -> AppError {
    AppError::not_found(
        format!("Task with ID {} was not found", id),
        json!({ "task_id": id }),
    )
}

fn user_not_found(id: i64) -> AppError {
    AppError::not_found(
        format!("User with ID {} was not found", id),
        json!({ "user_id": id }),
    )
}

/// Service for creating, reading, updating, deleting and listing tasks.
///
/// Every operation takes the authenticated [`Principal`] and applies the
/// rules in [`crate::domain::permissions`]. Status changes are reported to the
/// responsible person through the [`TaskNotifier`].
pub struct TaskService<T: TaskRepository, U: UserRepository> {
    tasks: Arc<T>,
    users: Arc<U>,
    notifier: Arc<dyn TaskNotifier>,
}

impl<T: TaskRepository, U: UserRepository> TaskService<T, U> {
    pub fn new(tasks: Arc<T>, users: Arc<U>, notifier: Arc<dyn TaskNotifier>) -> Self {
        Self {
            tasks,
            users,
            notifier,
        }
    }

    async fn ensure_users_exist(&self, ids: &[i64]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }

        let found = self.users.existing_ids(ids).await?;
        let missing: Vec<i64> = ids.iter().copied().filter(|id| !found.contains(id)).collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::not_found(
                "Executors not found",
                json!({ "missing_user_ids": missing }),
            ))
        }
    }

    async fn load(&self, id: i64) -> Result<Task, AppError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| task_not_found(id))
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a priority outside `0..=3`
    /// - [`AppError::NotFound`] if the responsible person or an executor does not exist
    /// - [`AppError::Forbidden`] if the caller's role may not assign to that person
    pub async fn create(&self, actor: &Principal, input: CreateTask) -> Result<Task, AppError> {
        validate_priority(input.priority)?;

        let responsible_id = input.responsible_person_id.unwrap_or(actor.id);
        let responsible = self
            .users
            .find_by_id(responsible_id)
            .await?
            .ok_or_else(|| user_not_found(responsible_id))?;

        permissions::check_task_creation(actor, &responsible)?;

        let executor_ids = dedup(input.executor_ids);
        self.ensure_users_exist(&executor_ids).await?;

        let task = self
            .tasks
            .create(NewTask {
                title: input.title,
                description: input.description,
                priority: input.priority,
                status: input.status,
                responsible_person_id: responsible.id,
                executor_ids,
            })
            .await?;

        metrics::counter!("tasks_created_total").increment(1);
        info!(task_id = task.id, user_id = actor.id, "Task created");

        Ok(task)
    }

    /// Fetches a task the caller may access.
    pub async fn get(&self, actor: &Principal, id: i64) -> Result<Task, AppError> {
        let task = self.load(id).await?;
        permissions::check_task_access(actor, &task)?;
        Ok(task)
    }

    /// Applies a partial update. A status change notifies the responsible person.
    pub async fn update(
        &self,
        actor: &Principal,
        id: i64,
        mut patch: TaskPatch,
    ) -> Result<Task, AppError> {
        let current = self.load(id).await?;
        permissions::check_task_access(actor, &current)?;

        if let Some(priority) = patch.priority {
            validate_priority(priority)?;
        }
        if let Some(ids) = patch.executor_ids.take() {
            let ids = dedup(ids);
            self.ensure_users_exist(&ids).await?;
            patch.executor_ids = Some(ids);
        }

        if patch.is_empty() {
            return Ok(current);
        }

        let updated = self.tasks.update(id, patch).await?;
        info!(task_id = id, user_id = actor.id, "Task updated");

        if updated.status != current.status {
            self.notify_status_change(&updated, current.status).await;
        }

        Ok(updated)
    }

    async fn notify_status_change(&self, task: &Task, old_status: TaskStatus) {
        let responsible = match self.users.find_by_id(task.responsible_person_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                warn!(
                    task_id = task.id,
                    error = %e,
                    "Could not load responsible person for notification"
                );
                return;
            }
        };

        self.notifier
            .status_changed(StatusChange {
                to_email: responsible.email,
                task_id: task.id,
                task_title: task.title.clone(),
                old_status,
                new_status: task.status,
            })
            .await;
    }

    /// Deletes a task and returns it as it was.
    pub async fn delete(&self, actor: &Principal, id: i64) -> Result<Task, AppError> {
        let task = self.load(id).await?;
        permissions::check_task_delete(actor, &task)?;

        if !self.tasks.delete(id).await? {
            return Err(task_not_found(id));
        }

        info!(task_id = id, user_id = actor.id, "Task deleted");
        Ok(task)
    }

    /// Lists tasks visible to the caller, newest first.
    pub async fn list(&self, actor: &Principal, query: ListTasks) -> Result<TaskPage, AppError> {
        validate_page(query.page, query.page_size)?;
        if let Some(priority) = query.priority {
            validate_priority(priority)?;
        }
        if let Some(responsible_id) = query.responsible_person_id {
            if self.users.find_by_id(responsible_id).await?.is_none() {
                return Err(user_not_found(responsible_id));
            }
        }

        let filter = TaskFilter {
            status: query.status,
            priority: query.priority,
            responsible_person_id: query.responsible_person_id,
            visible_to: permissions::visibility_scope(actor),
        };

        let limit = i64::from(query.page_size);
        let offset = i64::from(query.page - 1) * limit;

        let total = self.tasks.count(filter.clone()).await?;
        let tasks = self.tasks.list(filter, limit, offset).await?;

        Ok(TaskPage {
            tasks,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }
}
