mod common;

use sqlx::PgPool;
use std::sync::Arc;
use task_tracker::AppError;
use task_tracker::domain::entities::{NewUser, UserRole};
use task_tracker::domain::repositories::UserRepository;
use task_tracker::infrastructure::persistence::PgUserRepository;

fn new_user(username: &str, email: &str, role: UserRole) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "pbkdf2-sha256$1$AA$AA".to_string(),
        role,
    }
}

#[sqlx::test]
async fn test_create_and_find_user(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let created = repo
        .create(new_user("alice", "alice@example.com", UserRole::Manager))
        .await
        .unwrap();

    assert_eq!(created.username, "alice");
    assert_eq!(created.role, UserRole::Manager);

    let by_email = repo.find_by_email("alice@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "alice@example.com");
}

#[sqlx::test]
async fn test_find_missing_user(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    assert!(repo.find_by_id(999).await.unwrap().is_none());
    assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    repo.create(new_user("alice", "alice@example.com", UserRole::User))
        .await
        .unwrap();
    let result = repo
        .create(new_user("alice2", "alice@example.com", UserRole::User))
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_insert_all_if_absent(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let first = repo
        .insert_all_if_absent(vec![
            new_user("bob", "bob@example.com", UserRole::User),
            new_user("carol", "carol@example.com", UserRole::Manager),
        ])
        .await
        .unwrap();
    assert!(first.iter().all(Option::is_some));

    let second = repo
        .insert_all_if_absent(vec![
            new_user("bob", "other@example.com", UserRole::User),
            new_user("dave", "dave@example.com", UserRole::User),
        ])
        .await
        .unwrap();
    assert!(second[0].is_none());
    assert_eq!(second[1].as_ref().unwrap().username, "dave");

    assert_eq!(repo.count().await.unwrap(), 3);
}

#[sqlx::test]
async fn test_existing_ids(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let a = repo
        .create(new_user("a", "a@example.com", UserRole::User))
        .await
        .unwrap();
    let b = repo
        .create(new_user("b", "b@example.com", UserRole::User))
        .await
        .unwrap();

    let mut found = repo.existing_ids(&[a.id, b.id, 424242]).await.unwrap();
    found.sort_unstable();

    assert_eq!(found, vec![a.id, b.id]);
}
