//! Utility functions for credentials and tokens.
//!
//! - [`password`] - PBKDF2 password hashing and verification
//! - [`token`] - HS256 access token encoding and decoding

pub mod password;
pub mod token;
