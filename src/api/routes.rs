//! API route configuration.

use crate::api::handlers::{
    create_task_handler, delete_task_handler, get_task_handler, list_tasks_handler,
    login_handler, signup_handler, update_task_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Credential endpoints, public.
///
/// - `POST /auth/signup` - Register and receive a token
/// - `POST /auth/login`  - Exchange credentials for a token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
}

/// Task endpoints, to be wrapped in Bearer token authentication.
///
/// - `GET    /tasks`      - List visible tasks (filtered, paginated)
/// - `POST   /tasks`      - Create a task
/// - `GET    /tasks/{id}` - Fetch a task
/// - `PUT    /tasks/{id}` - Partially update a task
/// - `DELETE /tasks/{id}` - Delete a task
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
}
