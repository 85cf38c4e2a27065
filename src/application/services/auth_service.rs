//! Sign-up, login and bearer token authentication.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{NewUser, UserRole};
use crate::domain::permissions::Principal;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{self, PasswordError};
use crate::utils::token::TokenCodec;

/// Hashes a password on the blocking pool.
pub(crate) async fn hash_blocking(password: String, iterations: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || password::hash_with_iterations(&password, iterations))
        .await
        .map_err(|e| {
            AppError::internal("Password hashing task failed", json!({ "reason": e.to_string() }))
        })?
        .map_err(password_error)
}

async fn verify_blocking(password: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &stored))
        .await
        .map_err(|e| {
            AppError::internal("Password check task failed", json!({ "reason": e.to_string() }))
        })?
        .map_err(password_error)
}

fn password_error(e: PasswordError) -> AppError {
    tracing::error!(error = %e, "Password hashing failed");
    AppError::internal("Password hashing failed", json!({}))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized(
        "Invalid credentials",
        json!({ "reason": "Unknown email or wrong password" }),
    )
}

fn invalid_token(reason: impl Into<String>) -> AppError {
    AppError::unauthorized("Could not validate credentials", json!({ "reason": reason.into() }))
}

/// Registration input, already validated at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Service for user registration and token-based authentication.
///
/// New accounts always get [`UserRole::User`]; elevated roles come from the
/// seed data.
pub struct AuthService<R: UserRepository> {
    users: Arc<R>,
    tokens: TokenCodec,
    hash_iterations: u32,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(users: Arc<R>, tokens: TokenCodec) -> Self {
        Self {
            users,
            tokens,
            hash_iterations: password::DEFAULT_ITERATIONS,
        }
    }

    /// Overrides the PBKDF2 iteration count for new hashes.
    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.hash_iterations = iterations;
        self
    }

    /// Registers a user and returns an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email or username is taken.
    pub async fn sign_up(&self, input: SignUp) -> Result<String, AppError> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict(
                "Email already registered",
                json!({ "email": input.email }),
            ));
        }

        let password_hash = hash_blocking(input.password, self.hash_iterations).await?;

        let user = self
            .users
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                role: UserRole::User,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { details, .. } => {
                    AppError::conflict("Username or email already registered", details)
                }
                other => other,
            })?;

        metrics::counter!("signups_total").increment(1);
        info!(user_id = user.id, "User signed up");

        Ok(self.tokens.issue(user.id, &user.email, user.role, Utc::now()))
    }

    /// Checks credentials and returns an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email or a wrong
    /// password, without telling the two apart.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            return Err(invalid_credentials());
        }

        metrics::counter!("logins_total").increment(1);
        info!(user_id = user.id, "User logged in");

        Ok(self.tokens.issue(user.id, &user.email, user.role, Utc::now()))
    }

    /// Resolves a bearer token to the user it was issued for.
    ///
    /// The user is reloaded so deleted accounts and role changes take effect
    /// before the token expires.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed, forged,
    /// expired, or its user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let claims = self
            .tokens
            .decode(token, Utc::now())
            .map_err(|e| invalid_token(e.to_string()))?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| invalid_token("user no longer exists"))?;

        Ok(Principal::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::repositories::MockUserRepository;
    use crate::utils::password::hash_with_iterations;

    const SECRET: &str = "test-signing-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, 15)
    }

    fn stored_user(id: i64, email: &str, password: &str) -> User {
        User {
            id,
            username: "alice".to_string(),
            email: email.to_string(),
            password_hash: hash_with_iterations(password, 1000).unwrap(),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(repo: MockUserRepository) -> AuthService<MockUserRepository> {
        AuthService::new(Arc::new(repo), codec()).with_hash_iterations(1000)
    }

    #[tokio::test]
    async fn test_sign_up_issues_token_for_new_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|u| {
                u.email == "alice@example.com"
                    && u.role == UserRole::User
                    && u.password_hash.starts_with("pbkdf2-sha256$1000$")
            })
            .times(1)
            .returning(|u| {
                Ok(User {
                    id: 7,
                    username: u.username,
                    email: u.email,
                    password_hash: u.password_hash,
                    role: u.role,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let token = service(repo)
            .sign_up(SignUp {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let claims = codec().decode(&token, Utc::now()).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_taken_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(stored_user(1, email, "whatever1"))));
        repo.expect_create().times(0);

        let err = service(repo)
            .sign_up(SignUp {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(stored_user(3, email, "password123"))));

        let token = service(repo)
            .login("alice@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(codec().decode(&token, Utc::now()).unwrap().sub, 3);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(stored_user(3, email, "password123"))));

        let err = service(repo)
            .login("alice@example.com", "nope-nope")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let err = service(repo)
            .login("ghost@example.com", "password123")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_valid_token() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .withf(|id| *id == 3)
            .times(1)
            .returning(|id| Ok(Some(stored_user(id, "alice@example.com", "x"))));

        let token = codec().issue(3, "alice@example.com", UserRole::User, Utc::now());
        let principal = service(repo).authenticate(&token).await.unwrap();

        assert_eq!(principal.id, 3);
        assert_eq!(principal.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_authenticate_deleted_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let token = codec().issue(3, "alice@example.com", UserRole::User, Utc::now());
        let err = service(repo).authenticate(&token).await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_foreign_signature() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().times(0);

        let token = TokenCodec::new("other-secret", 15).issue(
            3,
            "alice@example.com",
            UserRole::Admin,
            Utc::now(),
        );
        let err = service(repo).authenticate(&token).await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }
}
