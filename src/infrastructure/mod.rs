//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`database`] - Connection pool with startup retry, embedded migrations
//! - [`notification`] - Notification delivery
//! - [`persistence`] - PostgreSQL repository implementations

pub mod database;
pub mod notification;
pub mod persistence;
