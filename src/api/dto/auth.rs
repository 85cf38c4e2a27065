//! DTOs for sign-up and login.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"), length(max = 100))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50))]
    pub username: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Access token returned by sign-up and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str, password: &str, username: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(signup("alice@example.com", "password123", "alice").validate().is_ok());
    }

    #[test]
    fn test_short_password_rejected() {
        let errors = signup("alice@example.com", "short", "alice")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_bad_email_rejected() {
        let errors = signup("not-an-email", "password123", "alice")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_username_length() {
        assert!(signup("a@example.com", "password123", "").validate().is_err());
        assert!(signup("a@example.com", "password123", &"x".repeat(51)).validate().is_err());
        assert!(signup("a@example.com", "password123", "Jane Doe").validate().is_ok());
    }
}
