use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{AuthService, TaskService};
use crate::domain::notifier::TaskNotifier;
use crate::infrastructure::notification::LogNotifier;
use crate::infrastructure::persistence::{PgTaskRepository, PgUserRepository};
use crate::utils::token::TokenCodec;

pub type Auth = AuthService<PgUserRepository>;
pub type Tasks = TaskService<PgTaskRepository, PgUserRepository>;

/// Shared handler state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<PgPool>,
    pub auth_service: Arc<Auth>,
    pub task_service: Arc<Tasks>,
}

impl AppState {
    /// Wires PostgreSQL repositories and the log notifier into the services.
    pub fn new(pool: Arc<PgPool>, tokens: TokenCodec) -> Self {
        let users = Arc::new(PgUserRepository::new(pool.clone()));
        let tasks = Arc::new(PgTaskRepository::new(pool.clone()));
        let notifier: Arc<dyn TaskNotifier> = Arc::new(LogNotifier::new());

        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), tokens)),
            task_service: Arc::new(TaskService::new(tasks, users, notifier)),
            pool,
        }
    }
}
