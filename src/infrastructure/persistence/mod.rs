//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row structs. PostgreSQL enums are read as
//! text and parsed into domain enums.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - User accounts
//! - [`PgTaskRepository`] - Tasks and executors

pub mod pg_task_repository;
pub mod pg_user_repository;

pub use pg_task_repository::PgTaskRepository;
pub use pg_user_repository::PgUserRepository;
