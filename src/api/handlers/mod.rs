//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod tasks;

pub use auth::{login_handler, signup_handler};
pub use health::{app_health_handler, db_health_handler};
pub use tasks::{
    create_task_handler, delete_task_handler, get_task_handler, list_tasks_handler,
    update_task_handler,
};
