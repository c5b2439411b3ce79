use axum::extract::State;
use deeds_storage::MemberId;
use tracing::debug;
use uuid::Uuid;

use super::ApiResult;
use crate::api::{list, CreateUserRequest, GroupResponse, MemberResponse, RenameUserRequest};
use crate::extract::{Json, Path};
use crate::server::DeedsServer;

/// Register (or fetch) a member by name.
pub async fn create_user(
    State(server): State<DeedsServer>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<MemberResponse> {
    let member = server.engine.add_member(&req.name).await?;
    Ok(Json(member.into()))
}

pub async fn list_users(State(server): State<DeedsServer>) -> ApiResult<Vec<MemberResponse>> {
    let members = server.engine.list_members().await?;
    Ok(Json(list(members)))
}

pub async fn login(
    State(server): State<DeedsServer>,
    Path(name): Path<String>,
) -> ApiResult<MemberResponse> {
    let member = server.engine.login(&name).await?;
    debug!(member_id = %member.id.0, "Member logged in");
    Ok(Json(member.into()))
}

pub async fn get_user(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<MemberResponse> {
    let member = server.engine.get_member(&MemberId(id)).await?;
    Ok(Json(member.into()))
}

pub async fn rename_user(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameUserRequest>,
) -> ApiResult<MemberResponse> {
    let member = server.engine.rename_member(&MemberId(id), &req.name).await?;
    Ok(Json(member.into()))
}

pub async fn list_user_groups(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<GroupResponse>> {
    let groups = server.engine.list_groups_for_member(&MemberId(id)).await?;
    Ok(Json(list(groups)))
}
