//! Outbound notifications.
//!
//! - [`LogNotifier`] - Writes status-change messages to the log instead of sending e-mail

mod log_notifier;

pub use log_notifier::LogNotifier;
