//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, permission checks and validation,
//! and give HTTP handlers and the admin CLI a single API.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Sign-up, login and bearer token checks
//! - [`services::task_service::TaskService`] - Task CRUD with role-based access
//! - [`services::seed_service::SeedService`] - Default user accounts

pub mod services;
