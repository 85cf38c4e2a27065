#![allow(dead_code)]

use axum_test::TestServer;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use task_tracker::domain::entities::{NewTask, NewUser, Task, TaskStatus, User, UserRole};
use task_tracker::domain::repositories::{TaskRepository, UserRepository};
use task_tracker::infrastructure::persistence::{PgTaskRepository, PgUserRepository};
use task_tracker::routes::base_router;
use task_tracker::state::AppState;
use task_tracker::utils::password::hash_with_iterations;
use task_tracker::utils::token::TokenCodec;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_PASSWORD: &str = "password123";

pub fn codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET, 15)
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::new(Arc::new(pool), codec())
}

pub fn make_server(pool: PgPool) -> TestServer {
    TestServer::new(base_router(create_test_state(pool))).unwrap()
}

pub async fn create_user(pool: &PgPool, username: &str, role: UserRole) -> User {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));
    repo.create(NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: hash_with_iterations(TEST_PASSWORD, 1000).unwrap(),
        role,
    })
    .await
    .unwrap()
}

pub fn token_for(user: &User) -> String {
    codec().issue(user.id, &user.email, user.role, Utc::now())
}

pub async fn create_task(
    pool: &PgPool,
    title: &str,
    responsible_person_id: i64,
    executor_ids: Vec<i64>,
) -> Task {
    let repo = PgTaskRepository::new(Arc::new(pool.clone()));
    repo.create(NewTask {
        title: title.to_string(),
        description: None,
        priority: 1,
        status: TaskStatus::Todo,
        responsible_person_id,
        executor_ids,
    })
    .await
    .unwrap()
}
