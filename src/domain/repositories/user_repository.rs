//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for users.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email or username is taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Creates each user unless one with the same email or username exists.
    ///
    /// All inserts commit together. The result holds one entry per input, in
    /// order, with `None` where the row already existed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors; nothing is written
    /// in that case.
    async fn insert_all_if_absent(
        &self,
        new_users: Vec<NewUser>,
    ) -> Result<Vec<Option<User>>, AppError>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Finds a user by email (exact match).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Returns the subset of `ids` that belong to existing users.
    async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, AppError>;

    /// Counts all users.
    async fn count(&self) -> Result<i64, AppError>;
}
