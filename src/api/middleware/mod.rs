//! Request middleware.
//!
//! - [`auth`] - Bearer token check that attaches the caller's `Principal`
//! - [`rate_limit`] - Per-IP limiter for the public auth endpoints
//! - [`tracing`] - Request spans

pub mod auth;
pub mod rate_limit;
pub mod tracing;
