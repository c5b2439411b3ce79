//! Deed completion and verification handler tests.

use super::super::common::*;
use crate::api::{DescribeRequest, SubmitRequest, UserQuery, VerifyRequest};
use crate::extract::{Json, Path, Query};
use crate::handlers::{deeds, rounds};
use crate::server::DeedsServer;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

async fn my_deed(
    server: &DeedsServer,
    round_id: Uuid,
    user_id: Uuid,
) -> crate::api::AssignmentResponse {
    let Json(deed) = rounds::my_deed(
        State(server.clone()),
        Path(round_id),
        Query(UserQuery { user_id }),
    )
    .await
    .unwrap();
    deed
}

fn verify_request(verifier_id: Uuid, decision: &str) -> Json<VerifyRequest> {
    Json(VerifyRequest {
        verifier_id,
        decision: decision.to_string(),
        note: None,
    })
}

#[tokio::test]
async fn handler_submit_then_approve() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;
    let deed = my_deed(&server, round.id, members[0].id).await;

    let Json(submitted) = deeds::submit(
        State(server.clone()),
        Path(deed.id),
        Json(SubmitRequest {
            giver_id: members[0].id,
            proof: Some("Shoveled their driveway".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(submitted.state, "submitted");
    assert!(submitted.submitted_at.is_some());

    // The giver cannot approve their own deed
    let err = deeds::verify(
        State(server.clone()),
        Path(deed.id),
        verify_request(members[0].id, "approve"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let Json(approved) = deeds::verify(
        State(server.clone()),
        Path(deed.id),
        verify_request(deed.recipient_id, "approve"),
    )
    .await
    .unwrap();
    assert_eq!(approved.state, "completed");
    assert!(approved.completed_at.is_some());
    assert_eq!(approved.verified_by, Some(deed.recipient_id));
}

#[tokio::test]
async fn handler_reject_and_resubmit() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;
    let deed = my_deed(&server, round.id, members[1].id).await;

    let submit = || {
        deeds::submit(
            State(server.clone()),
            Path(deed.id),
            Json(SubmitRequest {
                giver_id: members[1].id,
                proof: None,
            }),
        )
    };

    submit().await.unwrap();
    // Submitting twice is an error
    assert_eq!(submit().await.unwrap_err().status(), StatusCode::CONFLICT);

    let Json(rejected) = deeds::verify(
        State(server.clone()),
        Path(deed.id),
        Json(VerifyRequest {
            verifier_id: deed.recipient_id,
            decision: "reject".to_string(),
            note: Some("Try again".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(rejected.state, "rejected");
    assert_eq!(rejected.rejection_count, 1);

    let Json(again) = submit().await.unwrap();
    assert_eq!(again.state, "submitted");

    let Json(history) = deeds::history(State(server.clone()), Path(deed.id))
        .await
        .unwrap();
    let kinds: Vec<_> = history.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, ["submitted", "rejected", "submitted"]);
    assert_eq!(history[1].note.as_deref(), Some("Try again"));
    assert_eq!(history[1].actor_id, deed.recipient_id);
}

#[tokio::test]
async fn handler_verify_rejects_unknown_decision() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;
    let deed = my_deed(&server, round.id, members[0].id).await;

    let err = deeds::verify(
        State(server.clone()),
        Path(deed.id),
        verify_request(deed.recipient_id, "maybe"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn handler_verify_requires_submission() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;
    let deed = my_deed(&server, round.id, members[0].id).await;

    let err = deeds::verify(
        State(server.clone()),
        Path(deed.id),
        verify_request(deed.recipient_id, "approve"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn handler_owner_describes_blank_deed() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;
    let deed = my_deed(&server, round.id, members[1].id).await;
    assert_eq!(deed.description, "");

    let err = deeds::describe(
        State(server.clone()),
        Path(deed.id),
        Json(DescribeRequest {
            user_id: members[1].id,
            description: "Bake cookies".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let Json(described) = deeds::describe(
        State(server.clone()),
        Path(deed.id),
        Json(DescribeRequest {
            user_id: members[0].id,
            description: "Bake cookies".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(described.description, "Bake cookies");

    let Json(fetched) = deeds::get_deed(State(server.clone()), Path(deed.id))
        .await
        .unwrap();
    assert_eq!(fetched.description, "Bake cookies");
}
