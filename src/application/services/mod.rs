//! Business logic services for the application layer.

pub mod auth_service;
pub mod seed_service;
pub mod task_service;

pub use auth_service::{AuthService, SignUp};
pub use seed_service::{DEFAULT_USERS, SeedReport, SeedService};
pub use task_service::{CreateTask, ListTasks, TaskPage, TaskService};
