//! Handlers for task endpoints.
//!
//! All of them run behind [`crate::api::middleware::auth::layer`], which puts
//! the caller's [`Principal`] into request extensions.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::task::{
    TaskCreateRequest, TaskListQuery, TaskListResponse, TaskResponse, TaskUpdateRequest,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::domain::permissions::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a task.
///
/// # Endpoint
///
/// `POST /tasks`
///
/// # Errors
///
/// - 400 on validation failure
/// - 403 if the caller may not assign the responsible person
/// - 404 if the responsible person or an executor does not exist
pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(payload): ApiJson<TaskCreateRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    payload.validate()?;

    let task = state
        .task_service
        .create(&principal, payload.into())
        .await?;

    Ok(Json(task.into()))
}

/// `GET /tasks/{id}`
pub async fn get_task_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<TaskResponse>, AppError> {
    let task = state.task_service.get(&principal, id).await?;
    Ok(Json(task.into()))
}

/// Partially updates a task.
///
/// # Endpoint
///
/// `PUT /tasks/{id}`
pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<TaskUpdateRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    payload.validate()?;

    let task = state
        .task_service
        .update(&principal, id, payload.into())
        .await?;

    Ok(Json(task.into()))
}

/// Deletes a task and returns it.
///
/// # Endpoint
///
/// `DELETE /tasks/{id}`
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<TaskResponse>, AppError> {
    let task = state.task_service.delete(&principal, id).await?;
    Ok(Json(task.into()))
}

/// Lists tasks visible to the caller.
///
/// # Endpoint
///
/// `GET /tasks?status=&priority=&responsible_person_id=&page=&page_size=`
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<TaskListResponse>, AppError> {
    let page = state.task_service.list(&principal, query.into()).await?;
    Ok(Json(page.into()))
}
