//! Round lifecycle handler tests.

use std::collections::HashSet;

use super::super::common::*;
use crate::api::{AdvanceQuery, CreateRoundRequest, UserQuery, ViewerQuery};
use crate::extract::{Json, Path, Query};
use crate::handlers::{groups, rounds};
use crate::server::DeedsServer;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

async fn complete_all(server: &DeedsServer, round_id: Uuid, member_ids: &[Uuid]) {
    for id in member_ids {
        let Json(deed) = rounds::complete_my_deed(
            State(server.clone()),
            Path(round_id),
            Query(UserQuery { user_id: *id }),
        )
        .await
        .unwrap();
        assert_eq!(deed.state, "completed");
    }
}

async fn progress(
    server: &DeedsServer,
    round_id: Uuid,
    viewer: Option<Uuid>,
) -> crate::api::RoundProgressResponse {
    let Json(p) = rounds::check_complete(
        State(server.clone()),
        Path(round_id),
        Query(ViewerQuery { user_id: viewer }),
    )
    .await
    .unwrap();
    p
}

#[tokio::test]
async fn handler_round_full_cycle() {
    let server = create_direct_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B", "C"]).await;
    let ids: Vec<_> = members.iter().map(|m| m.id).collect();

    let round = open_test_round(&server, group.id, "Week 1").await;
    assert_eq!(round.status, "started");
    assert_eq!(round.access_code.as_deref().map(str::len), Some(6));

    // Everyone gives once and receives once, never to themselves
    let mut recipients = HashSet::new();
    for id in &ids {
        let Json(deed) = rounds::my_deed(
            State(server.clone()),
            Path(round.id),
            Query(UserQuery { user_id: *id }),
        )
        .await
        .unwrap();
        assert_eq!(deed.giver_id, *id);
        assert_ne!(deed.recipient_id, *id);
        recipients.insert(deed.recipient_id);
    }
    assert_eq!(recipients.len(), 3);

    let p = progress(&server, round.id, None).await;
    assert_eq!((p.completed_count, p.total_members), (0, 3));
    assert!(!p.all_complete);

    // Advancing early is refused
    let err = rounds::advance_round(
        State(server.clone()),
        Path(round.id),
        Query(AdvanceQuery::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    complete_all(&server, round.id, &ids).await;
    let p = progress(&server, round.id, None).await;
    assert!(p.all_complete);
    assert!(!p.round_completed);

    let Json(next) = rounds::advance_round(
        State(server.clone()),
        Path(round.id),
        Query(AdvanceQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(next.group_id, group.id);
    assert_eq!(next.status, "started");
    assert_eq!(next.name, "Week 1 (next)");

    let p = progress(&server, round.id, None).await;
    assert!(p.round_completed);
    assert_eq!(p.new_round_id, Some(next.id));

    let Json(old) = rounds::get_round(State(server.clone()), Path(round.id))
        .await
        .unwrap();
    assert_eq!(old.status, "closed");
    assert_eq!(old.successor_id, Some(next.id));

    let Json(listed) = groups::list_rounds(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, next.id);
}

#[tokio::test]
async fn handler_concurrent_advance_returns_same_round() {
    let server = create_direct_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B", "C"]).await;
    let ids: Vec<_> = members.iter().map(|m| m.id).collect();
    let round = open_test_round(&server, group.id, "Week 1").await;
    complete_all(&server, round.id, &ids).await;

    let (a, b) = tokio::join!(
        rounds::advance_round(
            State(server.clone()),
            Path(round.id),
            Query(AdvanceQuery {
                name: Some("Week 2".to_string())
            }),
        ),
        rounds::advance_round(
            State(server.clone()),
            Path(round.id),
            Query(AdvanceQuery {
                name: Some("Week 2".to_string())
            }),
        ),
    );
    let (Json(a), Json(b)) = (a.unwrap(), b.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(a.name, "Week 2");

    let Json(listed) = groups::list_rounds(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn handler_celebration_shown_once() {
    let server = create_direct_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B"]).await;
    let ids: Vec<_> = members.iter().map(|m| m.id).collect();
    let round = open_test_round(&server, group.id, "Week 1").await;
    complete_all(&server, round.id, &ids).await;

    assert!(progress(&server, round.id, Some(ids[0])).await.show_celebration);

    let status = rounds::celebration_seen(
        State(server.clone()),
        Path(round.id),
        Query(UserQuery { user_id: ids[0] }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(!progress(&server, round.id, Some(ids[0])).await.show_celebration);
    assert!(progress(&server, round.id, Some(ids[1])).await.show_celebration);
    // Without a viewer there is nobody to celebrate for
    assert!(!progress(&server, round.id, None).await.show_celebration);
}

#[tokio::test]
async fn handler_close_round_owner_only() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;

    let err = rounds::close_round(
        State(server.clone()),
        Path(round.id),
        Query(UserQuery {
            user_id: members[1].id,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let Json(closed) = rounds::close_round(
        State(server.clone()),
        Path(round.id),
        Query(UserQuery {
            user_id: members[0].id,
        }),
    )
    .await
    .unwrap();
    assert_eq!(closed.status, "closed");
    assert!(closed.successor_id.is_none());
}

#[tokio::test]
async fn handler_round_status_board() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A", "B", "C"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;

    // Verified policy: completing only submits
    let Json(deed) = rounds::complete_my_deed(
        State(server.clone()),
        Path(round.id),
        Query(UserQuery {
            user_id: members[0].id,
        }),
    )
    .await
    .unwrap();
    assert_eq!(deed.state, "submitted");

    let Json(board) = rounds::round_status(State(server.clone()), Path(round.id))
        .await
        .unwrap();
    assert_eq!(board.len(), 3);
    assert!(board.iter().all(|s| !s.completed));
    let a = board.iter().find(|s| s.member_id == members[0].id).unwrap();
    assert_eq!(a.name, "A");
    assert_eq!(a.state, "submitted");

    let Json(waiting) = rounds::pending_verifications(
        State(server.clone()),
        Path(round.id),
        Query(UserQuery {
            user_id: deed.recipient_id,
        }),
    )
    .await
    .unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].id, deed.id);
}

#[tokio::test]
async fn handler_my_deed_for_outsider() {
    let server = create_test_server().await;
    let (group, _) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;
    let outsider = create_test_user(&server, "Z").await;

    let err = rounds::my_deed(
        State(server.clone()),
        Path(round.id),
        Query(UserQuery {
            user_id: outsider.id,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handler_regenerate_code_while_pending() {
    let server = create_test_server().await;
    let (group, members) = create_test_group(&server, &["A"]).await;
    let outsider = create_test_user(&server, "B").await;

    // A lone member cannot start the round, so it stays pending
    let err = groups::open_round(
        State(server.clone()),
        Path(group.id),
        Json(CreateRoundRequest {
            name: "Week 1".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let Json(listed) = groups::list_rounds(State(server.clone()), Path(group.id))
        .await
        .unwrap();
    let round = &listed[0];
    assert_eq!(round.status, "pending");

    let regenerate = |user_id| {
        rounds::regenerate_code(
            State(server.clone()),
            Path(round.id),
            Query(UserQuery { user_id }),
        )
    };

    assert_eq!(
        regenerate(outsider.id).await.unwrap_err().status(),
        StatusCode::FORBIDDEN
    );
    let Json(updated) = regenerate(members[0].id).await.unwrap();
    assert_eq!(updated.access_code.as_deref().map(str::len), Some(6));

    groups::join_group(
        State(server.clone()),
        Path(group.id),
        Query(UserQuery {
            user_id: outsider.id,
        }),
    )
    .await
    .unwrap();
    rounds::start_round(State(server.clone()), Path(round.id))
        .await
        .unwrap();
    assert_eq!(
        regenerate(members[0].id).await.unwrap_err().status(),
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn handler_celebration_seen_rejects_outsiders() {
    let server = create_direct_test_server().await;
    let (group, _) = create_test_group(&server, &["A", "B"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;
    let outsider = create_test_user(&server, "Z").await;

    let err = rounds::celebration_seen(
        State(server.clone()),
        Path(round.id),
        Query(UserQuery {
            user_id: outsider.id,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}
