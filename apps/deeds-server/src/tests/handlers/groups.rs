//! Group handler tests.

use super::super::common::*;
use crate::api::{CreateGroupRequest, CreateRoundRequest, UserQuery};
use crate::extract::{Json, Path, Query};
use crate::handlers::{groups, rounds};
use axum::extract::State;
use axum::http::StatusCode;
use deeds_engine::EngineError;
use uuid::Uuid;

#[tokio::test]
async fn handler_group_create_and_members() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["Alice", "Bob", "Carol"]).await;

    let Json(fetched) = groups::get_group(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    assert_eq!(fetched.name, "Holiday Crew");

    let Json(listed) = groups::list_members(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    let names: Vec<_> = listed.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob", "Carol"]);
    assert_eq!(listed[0].id, members[0].id);
}

#[tokio::test]
async fn handler_group_create_unknown_owner() {
    let server = create_test_server().await;
    let err = groups::create_group(
        State(server.clone()),
        Json(CreateGroupRequest {
            name: "Nobody's".to_string(),
            owner_id: Uuid::now_v7(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handler_group_join_is_idempotent() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["Alice", "Bob"]).await;

    let status = groups::join_group(
        State(server.clone()),
        Path(group.id),
        Query(UserQuery {
            user_id: members[1].id,
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let Json(listed) = groups::list_members(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn handler_group_join_unknown_group() {
    let server = create_test_server().await;
    let alice = create_test_user(&server, "Alice").await;

    let err = groups::join_group(
        State(server.clone()),
        Path(Uuid::now_v7()),
        Query(UserQuery { user_id: alice.id }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err.0, EngineError::NotFound("group")));
}

#[tokio::test]
async fn handler_open_round_needs_two_members() {
    let server = create_test_server().await;
    let (group, _) = create_test_group(&server, &["Alice"]).await;

    let err = groups::open_round(
        State(server.clone()),
        Path(group.id),
        Json(CreateRoundRequest {
            name: "Week of Dec 9".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(matches!(
        err.0,
        EngineError::InsufficientMembers { found: 1 }
    ));

    // The round was created and left pending
    let Json(rounds_list) = groups::list_rounds(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    assert_eq!(rounds_list.len(), 1);
    assert_eq!(rounds_list[0].status, "pending");

    // After a second member joins it can be started
    let bob = create_test_user(&server, "Bob").await;
    groups::join_group(
        State(server.clone()),
        Path(group.id),
        Query(UserQuery { user_id: bob.id }),
    )
    .await
    .unwrap();
    let Json(started) = rounds::start_round(State(server.clone()), Path(rounds_list[0].id))
        .await
        .unwrap();
    assert_eq!(started.status, "started");

    let Json(current) = groups::current_round(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    assert_eq!(current.id, started.id);
}

#[tokio::test]
async fn handler_current_round_none() {
    let server = create_test_server().await;
    let (group, _) = create_test_group(&server, &["Alice", "Bob"]).await;

    let err = groups::current_round(State(server.clone()), Path(group.id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handler_second_started_round_is_rejected() {
    let server = create_test_server().await;
    let (group, _) = create_test_group(&server, &["Alice", "Bob"]).await;
    open_test_round(&server, group.id, "Week 1").await;

    let err = groups::open_round(
        State(server.clone()),
        Path(group.id),
        Json(CreateRoundRequest {
            name: "Week 1 again".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let Json(listed) = groups::list_rounds(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, "started");
}
