//! Member handler tests.

use super::super::common::*;
use crate::api::{CreateUserRequest, RenameUserRequest};
use crate::extract::{Json, Path};
use crate::handlers::users;
use axum::extract::State;
use axum::http::StatusCode;
use deeds_engine::EngineError;

#[tokio::test]
async fn handler_create_user_is_idempotent() {
    let server = create_test_server().await;

    let first = create_test_user(&server, "Alice").await;
    let Json(second) = users::create_user(
        State(server.clone()),
        Json(CreateUserRequest {
            name: " Alice ".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(first.id, second.id);

    let Json(all) = users::list_users(State(server.clone())).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Alice");
}

#[tokio::test]
async fn handler_create_user_rejects_blank_name() {
    let server = create_test_server().await;
    let err = users::create_user(
        State(server.clone()),
        Json(CreateUserRequest {
            name: "   ".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn handler_login() {
    let server = create_test_server().await;
    let alice = create_test_user(&server, "Alice").await;

    let Json(found) = users::login(State(server.clone()), Path("Alice".to_string()))
        .await
        .unwrap();
    assert_eq!(found.id, alice.id);

    let err = users::login(State(server.clone()), Path("Mallory".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err.0, EngineError::NotFound("member")));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handler_rename_user() {
    let server = create_test_server().await;
    create_test_user(&server, "Alice").await;
    let bob = create_test_user(&server, "Bob").await;

    let err = users::rename_user(
        State(server.clone()),
        Path(bob.id),
        Json(RenameUserRequest {
            name: "Alice".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let Json(renamed) = users::rename_user(
        State(server.clone()),
        Path(bob.id),
        Json(RenameUserRequest {
            name: "Robert".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "Robert");

    let Json(fetched) = users::get_user(State(server.clone()), Path(bob.id))
        .await
        .unwrap();
    assert_eq!(fetched.name, "Robert");
}

#[tokio::test]
async fn handler_list_user_groups() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["Alice", "Bob"]).await;

    let Json(groups) = users::list_user_groups(State(server.clone()), Path(members[1].id))
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, group.id);
    assert_eq!(groups[0].owner_id, members[0].id);
}
