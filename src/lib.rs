//! # Task Tracker
//!
//! A task tracking back-end built with Axum and PostgreSQL, shipped with the
//! container topology it runs under and its migrate/seed lifecycle.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, permission rules and repository traits
//! - **Application Layer** ([`application`]) - Auth, task and seed services
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL, migrations, notifications
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//! - **Deployment** ([`deploy`]) - Compose descriptor, environment binding, orchestrator driver
//!
//! ## Quick Start
//!
//! ```bash
//! cp .env.example .env
//! docker compose up --build
//! docker compose exec app admin migrate
//! docker compose exec app admin seed
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod deploy;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;
pub mod telemetry;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AuthService, SeedService, TaskService};
    pub use crate::domain::entities::{Task, TaskStatus, User, UserRole};
    pub use crate::domain::permissions::Principal;
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
