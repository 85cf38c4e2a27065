//! Domain layer containing business entities and rules.
//!
//! Nothing in here talks to PostgreSQL or HTTP directly.
//!
//! # Architecture
//!
//! - [`entities`] - Users, tasks and their inputs
//! - [`permissions`] - Role-based access rules for tasks
//! - [`repositories`] - Data access trait definitions
//! - [`notifier`] - Outbound notification contract
//!
//! Repository and notifier traits are implemented in
//! [`crate::infrastructure`]; services in [`crate::application::services`]
//! combine them with the permission rules.

pub mod entities;
pub mod notifier;
pub mod permissions;
pub mod repositories;
