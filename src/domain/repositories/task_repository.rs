//! Repository trait for tasks.

use crate::domain::entities::{NewTask, Task, TaskFilter, TaskPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for tasks and their executor sets.
///
/// Every returned [`Task`] carries its `executor_ids`, sorted ascending.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTaskRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_task.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Creates a task together with its executors.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if a referenced user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_task: NewTask) -> Result<Task, AppError>;

    /// Finds a task by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the task does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task, AppError>;

    /// Deletes a task. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists tasks matching `filter`, newest first.
    async fn list(&self, filter: TaskFilter, limit: i64, offset: i64)
    -> Result<Vec<Task>, AppError>;

    /// Counts tasks matching `filter`.
    async fn count(&self, filter: TaskFilter) -> Result<i64, AppError>;
}
