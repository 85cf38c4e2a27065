//! PostgreSQL implementation of task repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewTask, Task, TaskFilter, TaskPatch, TaskStatus};
use crate::domain::repositories::TaskRepository;
use crate::error::AppError;

const TASK_COLUMNS: &str = r#"
    t.id, t.title, t.description, t.priority, t.status::text AS status,
    t.responsible_person_id, t.created_at, t.updated_at,
    COALESCE(
        (SELECT array_agg(e.user_id ORDER BY e.user_id)
         FROM task_executors e WHERE e.task_id = t.id),
        '{}'::bigint[]
    ) AS executor_ids
"#;

/// Parameters `$1..$4`: status, priority, responsible person, visible-to user.
const TASK_FILTER: &str = r#"
    ($1::text IS NULL OR t.status = CAST($1 AS task_status))
    AND ($2::int IS NULL OR t.priority = $2)
    AND ($3::bigint IS NULL OR t.responsible_person_id = $3)
    AND ($4::bigint IS NULL
         OR t.responsible_person_id = $4
         OR EXISTS (SELECT 1 FROM task_executors e WHERE e.task_id = t.id AND e.user_id = $4))
"#;

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    priority: i32,
    status: String,
    responsible_person_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    executor_ids: Vec<i64>,
}

impl TryFrom<TaskRow> for Task {
    type Error = AppError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = TaskStatus::from_db_str(&row.status).ok_or_else(|| {
            AppError::internal(
                "Unexpected task status in database",
                json!({ "status": row.status }),
            )
        })?;

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            priority: row.priority,
            status,
            responsible_person_id: row.responsible_person_id,
            executor_ids: row.executor_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL repository for tasks.
///
/// Task rows and their executor links are written in one transaction.
pub struct PgTaskRepository {
    pool: Arc<PgPool>,
}

impl PgTaskRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

async fn fetch_task(conn: &mut PgConnection, id: i64) -> Result<Option<Task>, AppError> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = $1");

    let row: Option<TaskRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    row.map(Task::try_from).transpose()
}

async fn replace_executors(
    conn: &mut PgConnection,
    task_id: i64,
    executor_ids: &[i64],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM task_executors WHERE task_id = $1")
        .bind(task_id)
        .execute(&mut *conn)
        .await?;

    if !executor_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO task_executors (task_id, user_id)
            SELECT $1, u FROM UNNEST($2::bigint[]) AS u
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(executor_ids)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, new_task: NewTask) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tasks (title, description, priority, status, responsible_person_id)
            VALUES ($1, $2, $3, CAST($4 AS task_status), $5)
            RETURNING id
            "#,
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.priority)
        .bind(new_task.status.as_db_str())
        .bind(new_task.responsible_person_id)
        .fetch_one(&mut *tx)
        .await?;

        replace_executors(&mut tx, id, &new_task.executor_ids).await?;

        let task = fetch_task(&mut tx, id).await?.ok_or_else(|| {
            AppError::internal("Inserted task disappeared", json!({ "task_id": id }))
        })?;

        tx.commit().await?;

        Ok(task)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_task(&mut conn, id).await
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;

        let (clear_or_set_description, description) = match patch.description {
            Some(value) => (true, value),
            None => (false, None),
        };

        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                priority = COALESCE($5, priority),
                status = COALESCE(CAST($6 AS task_status), status)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(clear_or_set_description)
        .bind(&description)
        .bind(patch.priority)
        .bind(patch.status.map(|s| s.as_db_str()))
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Err(AppError::not_found(
                format!("Task with ID {} was not found", id),
                json!({ "task_id": id }),
            ));
        }

        if let Some(executor_ids) = &patch.executor_ids {
            replace_executors(&mut tx, id, executor_ids).await?;
        }

        let task = fetch_task(&mut tx, id).await?.ok_or_else(|| {
            AppError::not_found(
                format!("Task with ID {} was not found", id),
                json!({ "task_id": id }),
            )
        })?;

        tx.commit().await?;

        Ok(task)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        filter: TaskFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            WHERE {TASK_FILTER}
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $5 OFFSET $6
            "#
        );

        let rows: Vec<TaskRow> = sqlx::query_as(&sql)
            .bind(filter.status.map(|s| s.as_db_str()))
            .bind(filter.priority)
            .bind(filter.responsible_person_id)
            .bind(filter.visible_to)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn count(&self, filter: TaskFilter) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM tasks t WHERE {TASK_FILTER}");

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(filter.status.map(|s| s.as_db_str()))
            .bind(filter.priority)
            .bind(filter.responsible_person_id)
            .bind(filter.visible_to)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
