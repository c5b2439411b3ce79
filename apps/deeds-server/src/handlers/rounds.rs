use axum::{extract::State, http::StatusCode};
use deeds_storage::{MemberId, RoundId};
use uuid::Uuid;

use super::ApiResult;
use crate::api::{
    list, AdvanceQuery, AssignmentResponse, MemberStatusResponse, RoundProgressResponse,
    RoundResponse, UserQuery, ViewerQuery,
};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::server::DeedsServer;

pub async fn get_round(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<RoundResponse> {
    let round = server.engine.get_round(&RoundId(id)).await?;
    Ok(Json(round.into()))
}

/// Start a pending round (e.g. one left pending for lack of members).
pub async fn start_round(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<RoundResponse> {
    let round = server.engine.start_round(&RoundId(id)).await?;
    Ok(Json(round.into()))
}

pub async fn round_status(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MemberStatusResponse>> {
    let board = server.engine.round_status(&RoundId(id)).await?;
    Ok(Json(list(board)))
}

pub async fn check_complete(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<ViewerQuery>,
) -> ApiResult<RoundProgressResponse> {
    let viewer = q.user_id.map(MemberId);
    let progress = server
        .engine
        .check_round_complete(&RoundId(id), viewer.as_ref())
        .await?;
    Ok(Json(progress.into()))
}

/// Close a completed round and return its successor.
pub async fn advance_round(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<AdvanceQuery>,
) -> ApiResult<RoundResponse> {
    let next = server
        .engine
        .advance_to_next_round(&RoundId(id), q.name.as_deref())
        .await?;
    Ok(Json(next.into()))
}

pub async fn close_round(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> ApiResult<RoundResponse> {
    let round = server
        .engine
        .close_round(&RoundId(id), &MemberId(q.user_id))
        .await?;
    Ok(Json(round.into()))
}

/// Owner-only, while the round is still pending.
pub async fn regenerate_code(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> ApiResult<RoundResponse> {
    let round = server
        .engine
        .regenerate_access_code(&RoundId(id), &MemberId(q.user_id))
        .await?;
    Ok(Json(round.into()))
}

pub async fn celebration_seen(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    server
        .engine
        .mark_celebration_seen(&RoundId(id), &MemberId(q.user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_deed(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> ApiResult<AssignmentResponse> {
    let deed = server
        .engine
        .get_my_deed(&RoundId(id), &MemberId(q.user_id))
        .await?;
    Ok(Json(deed.into()))
}

pub async fn pending_verifications(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> ApiResult<Vec<AssignmentResponse>> {
    let deeds = server
        .engine
        .pending_verifications(&RoundId(id), &MemberId(q.user_id))
        .await?;
    Ok(Json(list(deeds)))
}

/// Mark the caller's own deed in a round as done.
pub async fn complete_my_deed(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> ApiResult<AssignmentResponse> {
    let member_id = MemberId(q.user_id);
    let deed = server.engine.get_my_deed(&RoundId(id), &member_id).await?;
    let deed = server.engine.complete_deed(&deed.id, &member_id).await?;
    Ok(Json(deed.into()))
}
