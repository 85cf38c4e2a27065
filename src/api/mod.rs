//! HTTP surface of the task tracker.
//!
//! Handlers validate payloads, resolve the caller and delegate to the
//! application services; errors render through [`crate::error::AppError`].
//!
//! # Modules
//!
//! - [`dto`] - Request and response bodies
//! - [`extract`] - Body, query and path extractors with enveloped rejections
//! - [`handlers`] - Auth, task and health handlers
//! - [`middleware`] - Authentication, rate limiting, tracing
//! - [`routes`] - `/auth` and `/tasks` routers

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
