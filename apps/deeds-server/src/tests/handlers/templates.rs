//! Deed template handler tests.

use super::super::common::*;
use crate::api::{CreateTemplateRequest, SetTemplateActiveRequest, TemplatesQuery, UserQuery};
use crate::extract::{Json, Path, Query};
use crate::handlers::{rounds, templates};
use axum::extract::State;
use axum::http::StatusCode;

#[tokio::test]
async fn handler_templates_lifecycle() {
    let server = create_test_server().await;

    let Json(note) = templates::create_template(
        State(server.clone()),
        Json(CreateTemplateRequest {
            description: "Write a thank-you note".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(note.active);
    templates::create_template(
        State(server.clone()),
        Json(CreateTemplateRequest {
            description: "Cook someone dinner".to_string(),
        }),
    )
    .await
    .unwrap();

    let Json(retired) = templates::set_active(
        State(server.clone()),
        Path(note.id),
        Json(SetTemplateActiveRequest { active: false }),
    )
    .await
    .unwrap();
    assert!(!retired.active);

    let Json(active) = templates::list_templates(
        State(server.clone()),
        Query(TemplatesQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].description, "Cook someone dinner");

    let Json(all) = templates::list_templates(
        State(server.clone()),
        Query(TemplatesQuery { all: Some(true) }),
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn handler_template_rejects_blank() {
    let server = create_test_server().await;
    let err = templates::create_template(
        State(server.clone()),
        Json(CreateTemplateRequest {
            description: "  ".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn handler_rounds_draw_from_active_templates() {
    let server = create_test_server().await;
    templates::create_template(
        State(server.clone()),
        Json(CreateTemplateRequest {
            description: "Leave a kind note".to_string(),
        }),
    )
    .await
    .unwrap();

    let (group, members) = create_test_group(&server, &["A", "B", "C"]).await;
    let round = open_test_round(&server, group.id, "Week 1").await;

    for m in &members {
        let Json(deed) = rounds::my_deed(
            State(server.clone()),
            Path(round.id),
            Query(UserQuery { user_id: m.id }),
        )
        .await
        .unwrap();
        assert_eq!(deed.description, "Leave a kind note");
    }
}
