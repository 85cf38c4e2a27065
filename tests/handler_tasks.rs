mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;
use task_tracker::domain::entities::UserRole;

#[sqlx::test]
async fn test_tasks_require_token(pool: PgPool) {
    let server = common::make_server(pool);

    server
        .get("/tasks")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/tasks")
        .authorization_bearer("not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_token_for_deleted_user_is_rejected(pool: PgPool) {
    let user = common::create_user(&pool, "gone", UserRole::User).await;
    let token = common::token_for(&user);
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let server = common::make_server(pool);

    server
        .get("/tasks")
        .authorization_bearer(token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_task_lifecycle(pool: PgPool) {
    let owner = common::create_user(&pool, "owner", UserRole::User).await;
    let token = common::token_for(&owner);
    let server = common::make_server(pool);

    let created = server
        .post("/tasks")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Write docs", "priority": 2 }))
        .await;
    created.assert_status_ok();
    let task = created.json::<Value>();
    let id = task["id"].as_i64().unwrap();
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["responsible_person_id"], owner.id);

    let fetched = server
        .get(&format!("/tasks/{}", id))
        .authorization_bearer(&token)
        .await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>()["title"], "Write docs");

    let updated = server
        .put(&format!("/tasks/{}", id))
        .authorization_bearer(&token)
        .json(&json!({ "status": "In progress", "description": "first draft" }))
        .await;
    updated.assert_status_ok();
    let updated = updated.json::<Value>();
    assert_eq!(updated["status"], "In progress");
    assert_eq!(updated["description"], "first draft");
    assert_eq!(updated["priority"], 2);

    let deleted = server
        .delete(&format!("/tasks/{}", id))
        .authorization_bearer(&token)
        .await;
    deleted.assert_status_ok();
    assert_eq!(deleted.json::<Value>()["id"], id);

    server
        .get(&format!("/tasks/{}", id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_create_task_validation(pool: PgPool) {
    let owner = common::create_user(&pool, "owner", UserRole::User).await;
    let token = common::token_for(&owner);
    let server = common::make_server(pool);

    server
        .post("/tasks")
        .authorization_bearer(&token)
        .json(&json!({ "title": "", "priority": 1 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/tasks")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Too urgent", "priority": 7 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_create_task_with_unknown_executor(pool: PgPool) {
    let owner = common::create_user(&pool, "owner", UserRole::Manager).await;
    let token = common::token_for(&owner);
    let server = common::make_server(pool);

    let response = server
        .post("/tasks")
        .authorization_bearer(&token)
        .json(&json!({ "title": "Ghost work", "executor_ids": [987654] }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_user_cannot_assign_to_others(pool: PgPool) {
    let user = common::create_user(&pool, "plain", UserRole::User).await;
    let other = common::create_user(&pool, "other", UserRole::User).await;
    let server = common::make_server(pool);

    let response = server
        .post("/tasks")
        .authorization_bearer(common::token_for(&user))
        .json(&json!({ "title": "Yours now", "responsible_person_id": other.id }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_manager_cannot_assign_to_admin(pool: PgPool) {
    let manager = common::create_user(&pool, "boss", UserRole::Manager).await;
    let admin = common::create_user(&pool, "root", UserRole::Admin).await;
    let server = common::make_server(pool);

    let response = server
        .post("/tasks")
        .authorization_bearer(common::token_for(&manager))
        .json(&json!({ "title": "Upward", "responsible_person_id": admin.id }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_outsider_is_forbidden(pool: PgPool) {
    let owner = common::create_user(&pool, "owner", UserRole::User).await;
    let outsider = common::create_user(&pool, "outsider", UserRole::Manager).await;
    let task = common::create_task(&pool, "Private", owner.id, vec![]).await;
    let token = common::token_for(&outsider);
    let server = common::make_server(pool);

    server
        .get(&format!("/tasks/{}", task.id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .put(&format!("/tasks/{}", task.id))
        .authorization_bearer(&token)
        .json(&json!({ "title": "Hijacked" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    server
        .delete(&format!("/tasks/{}", task.id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_executor_user_cannot_delete(pool: PgPool) {
    let owner = common::create_user(&pool, "owner", UserRole::User).await;
    let helper = common::create_user(&pool, "helper", UserRole::User).await;
    let task = common::create_task(&pool, "Shared", owner.id, vec![helper.id]).await;
    let token = common::token_for(&helper);
    let server = common::make_server(pool);

    server
        .get(&format!("/tasks/{}", task.id))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
    server
        .delete(&format!("/tasks/{}", task.id))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_admin_sees_everything(pool: PgPool) {
    let admin = common::create_user(&pool, "root", UserRole::Admin).await;
    let a = common::create_user(&pool, "a", UserRole::User).await;
    let b = common::create_user(&pool, "b", UserRole::User).await;
    common::create_task(&pool, "a's", a.id, vec![]).await;
    common::create_task(&pool, "b's", b.id, vec![]).await;
    let server = common::make_server(pool);

    let admin_view = server
        .get("/tasks")
        .authorization_bearer(common::token_for(&admin))
        .await;
    admin_view.assert_status_ok();
    assert_eq!(admin_view.json::<Value>()["total"], 2);

    let user_view = server
        .get("/tasks")
        .authorization_bearer(common::token_for(&a))
        .await;
    user_view.assert_status_ok();
    let body = user_view.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["title"], "a's");
}

#[sqlx::test]
async fn test_list_pagination_and_filters(pool: PgPool) {
    let admin = common::create_user(&pool, "root", UserRole::Admin).await;
    for i in 0..3 {
        common::create_task(&pool, &format!("task {}", i), admin.id, vec![]).await;
    }
    let token = common::token_for(&admin);
    let server = common::make_server(pool);

    let page = server
        .get("/tasks?page=2&page_size=2")
        .authorization_bearer(&token)
        .await;
    page.assert_status_ok();
    let body = page.json::<Value>();
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

    let done = server
        .get("/tasks?status=Done")
        .authorization_bearer(&token)
        .await;
    done.assert_status_ok();
    assert_eq!(done.json::<Value>()["total"], 0);

    server
        .get("/tasks?page=0")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_list_unknown_responsible_person(pool: PgPool) {
    let admin = common::create_user(&pool, "root", UserRole::Admin).await;
    let server = common::make_server(pool);

    server
        .get("/tasks?responsible_person_id=424242")
        .authorization_bearer(common::token_for(&admin))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_bad_query_and_path_values_use_error_envelope(pool: PgPool) {
    let admin = common::create_user(&pool, "root", UserRole::Admin).await;
    let token = common::token_for(&admin);
    let server = common::make_server(pool);

    for path in ["/tasks?page=abc", "/tasks?status=bogus", "/tasks/abc"] {
        let response = server.get(path).authorization_bearer(&token).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"]["code"],
            "validation_error",
            "{}",
            path
        );
    }
}

#[sqlx::test]
async fn test_create_task_wrong_field_type(pool: PgPool) {
    let owner = common::create_user(&pool, "owner", UserRole::User).await;
    let server = common::make_server(pool);

    let response = server
        .post("/tasks")
        .authorization_bearer(common::token_for(&owner))
        .json(&json!({ "title": "Typed", "priority": "high" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");
}
