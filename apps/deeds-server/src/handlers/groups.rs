use axum::{extract::State, http::StatusCode};
use deeds_storage::{GroupId, MemberId};
use uuid::Uuid;

use super::ApiResult;
use crate::api::{
    list, CreateGroupRequest, CreateRoundRequest, GroupResponse, MemberResponse, RoundResponse,
    UserQuery,
};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::server::DeedsServer;

pub async fn create_group(
    State(server): State<DeedsServer>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<GroupResponse> {
    let group = server
        .engine
        .create_group(&req.name, &MemberId(req.owner_id))
        .await?;
    Ok(Json(group.into()))
}

pub async fn get_group(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<GroupResponse> {
    let group = server.engine.get_group(&GroupId(id)).await?;
    Ok(Json(group.into()))
}

pub async fn join_group(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Query(q): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    server
        .engine
        .join_group(&GroupId(id), &MemberId(q.user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MemberResponse>> {
    let members = server.engine.list_group_members(&GroupId(id)).await?;
    Ok(Json(list(members)))
}

/// Rounds of a group, newest first.
pub async fn list_rounds(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<RoundResponse>> {
    let rounds = server.engine.list_rounds(&GroupId(id)).await?;
    Ok(Json(list(rounds)))
}

pub async fn current_round(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<RoundResponse> {
    let round = server.engine.current_round(&GroupId(id)).await?;
    Ok(Json(round.into()))
}

/// Create a round and start it. On failure the round stays pending.
pub async fn open_round(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateRoundRequest>,
) -> ApiResult<RoundResponse> {
    let round = server.engine.open_round(&GroupId(id), &req.name).await?;
    Ok(Json(round.into()))
}
