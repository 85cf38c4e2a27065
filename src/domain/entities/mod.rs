//! Core domain entities representing the task tracker data model.
//!
//! Entities are plain data structures; access rules live in
//! [`crate::domain::permissions`].
//!
//! # Entity Types
//!
//! - [`User`] - An account with a [`UserRole`]
//! - [`Task`] - A unit of work with a responsible person and executors
//!
//! Creation and partial-update inputs are separate structs
//! ([`NewUser`], [`NewTask`], [`TaskPatch`]).

pub mod task;
pub mod user;

pub use task::{MAX_PRIORITY, MIN_PRIORITY, NewTask, Task, TaskFilter, TaskPatch, TaskStatus};
pub use user::{NewUser, User, UserRole};
