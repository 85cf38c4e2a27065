//! Baseline user accounts.

use std::sync::Arc;
use tracing::info;

use crate::application::services::auth_service::hash_blocking;
use crate::domain::entities::{NewUser, UserRole};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password;

/// A default account inserted by the seed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedUser {
    pub username: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub role: UserRole,
}

pub const DEFAULT_USERS: [SeedUser; 3] = [
    SeedUser {
        username: "admin",
        email: "admin@example.com",
        password: "admin1234",
        role: UserRole::Admin,
    },
    SeedUser {
        username: "manager",
        email: "manager@example.com",
        password: "manager1234",
        role: UserRole::Manager,
    },
    SeedUser {
        username: "user",
        email: "user@example.com",
        password: "user1234",
        role: UserRole::User,
    },
];

/// Usernames created and skipped by one seed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Inserts [`DEFAULT_USERS`]. Accounts that already exist, by email or
/// username, are left untouched, so seeding twice is safe. The inserts
/// commit together.
pub struct SeedService<R: UserRepository> {
    users: Arc<R>,
    hash_iterations: u32,
}

impl<R: UserRepository> SeedService<R> {
    pub fn new(users: Arc<R>) -> Self {
        Self {
            users,
            hash_iterations: password::DEFAULT_ITERATIONS,
        }
    }

    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.hash_iterations = iterations;
        self
    }

    pub async fn seed(&self) -> Result<SeedReport, AppError> {
        let mut new_users = Vec::with_capacity(DEFAULT_USERS.len());
        for account in DEFAULT_USERS {
            let password_hash =
                hash_blocking(account.password.to_string(), self.hash_iterations).await?;

            new_users.push(NewUser {
                username: account.username.to_string(),
                email: account.email.to_string(),
                password_hash,
                role: account.role,
            });
        }

        let inserted = self.users.insert_all_if_absent(new_users).await?;

        let mut report = SeedReport::default();
        for (account, user) in DEFAULT_USERS.iter().zip(inserted) {
            match user {
                Some(user) => {
                    info!(user_id = user.id, username = account.username, "Seeded user");
                    report.created.push(account.username.to_string());
                }
                None => {
                    info!(username = account.username, "User already present, skipping");
                    report.skipped.push(account.username.to_string());
                }
            }
        }

        metrics::counter!("seeded_users_total").increment(report.created.len() as u64);
        Ok(report)
    }
}
