//! Common test helpers and utilities for server tests.
//!
//! This module provides shared test infrastructure including:
//! - Test server creation over in-memory SQLite
//! - Member, group and round creation helpers
//! - Response body decoding for router tests

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use deeds_engine::CompletionPolicy;
use deeds_store_sqlite::SqliteStore;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use uuid::Uuid;

use crate::api::{
    CreateGroupRequest, CreateRoundRequest, CreateUserRequest, GroupResponse, MemberResponse,
    RoundResponse, UserQuery,
};
use crate::config::ServerConfig;
use crate::extract::{Json, Path, Query};
use crate::handlers::{groups, users};
use crate::server::DeedsServer;

/// Test helper: Create a DeedsServer with in-memory SQLite and the given config
pub async fn create_test_server_with(config: ServerConfig) -> DeedsServer {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (_tx, ready) = watch::channel(true);
    DeedsServer::new(store, config, None, ready)
}

/// Test helper: Create a DeedsServer with the default (verified) completion policy
pub async fn create_test_server() -> DeedsServer {
    create_test_server_with(ServerConfig::default()).await
}

/// Test helper: Create a DeedsServer where claiming a deed completes it
pub async fn create_direct_test_server() -> DeedsServer {
    create_test_server_with(ServerConfig {
        completion_policy: CompletionPolicy::Direct,
        ..ServerConfig::default()
    })
    .await
}

/// Test helper: Register a member
pub async fn create_test_user(server: &DeedsServer, name: &str) -> MemberResponse {
    let Json(member) = users::create_user(
        State(server.clone()),
        Json(CreateUserRequest {
            name: name.to_string(),
        }),
    )
    .await
    .unwrap();
    member
}

/// Test helper: Create a group owned by the first name and joined by the rest
pub async fn create_test_group(
    server: &DeedsServer,
    names: &[&str],
) -> (GroupResponse, Vec<MemberResponse>) {
    let mut members = Vec::new();
    for name in names {
        members.push(create_test_user(server, name).await);
    }

    let Json(group) = groups::create_group(
        State(server.clone()),
        Json(CreateGroupRequest {
            name: "Holiday Crew".to_string(),
            owner_id: members[0].id,
        }),
    )
    .await
    .unwrap();

    for m in &members[1..] {
        let status = groups::join_group(
            State(server.clone()),
            Path(group.id),
            Query(UserQuery { user_id: m.id }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    (group, members)
}

/// Test helper: Create and start a round in a group
pub async fn open_test_round(server: &DeedsServer, group_id: Uuid, name: &str) -> RoundResponse {
    let Json(round) = groups::open_round(
        State(server.clone()),
        Path(group_id),
        Json(CreateRoundRequest {
            name: name.to_string(),
        }),
    )
    .await
    .unwrap();
    round
}

/// Test helper: Decode a JSON response body
pub async fn response_json<T: DeserializeOwned>(response: Response) -> (StatusCode, T) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}
