use axum::extract::State;
use deeds_engine::Decision;
use deeds_storage::{AssignmentId, MemberId};
use uuid::Uuid;

use super::ApiResult;
use crate::api::{
    list, AssignmentEventResponse, AssignmentResponse, DescribeRequest, SubmitRequest,
    VerifyRequest,
};
use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::server::DeedsServer;

pub async fn get_deed(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<AssignmentResponse> {
    let deed = server.engine.get_deed(&AssignmentId(id)).await?;
    Ok(Json(deed.into()))
}

/// Giver submits a deed as done, optionally with proof.
pub async fn submit(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<AssignmentResponse> {
    let deed = server
        .engine
        .submit_for_completion(
            &AssignmentId(id),
            &MemberId(req.giver_id),
            req.proof.as_deref(),
        )
        .await?;
    Ok(Json(deed.into()))
}

pub async fn verify(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<AssignmentResponse> {
    let decision = req
        .decision
        .parse::<Decision>()
        .map_err(|e| ApiError::invalid_input(e.to_string()))?;
    let deed = server
        .engine
        .verify(
            &AssignmentId(id),
            &MemberId(req.verifier_id),
            decision,
            req.note.as_deref(),
        )
        .await?;
    Ok(Json(deed.into()))
}

/// Group owner writes the deed text.
pub async fn describe(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<DescribeRequest>,
) -> ApiResult<AssignmentResponse> {
    let deed = server
        .engine
        .describe_deed(&AssignmentId(id), &MemberId(req.user_id), &req.description)
        .await?;
    Ok(Json(deed.into()))
}

pub async fn history(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<AssignmentEventResponse>> {
    let events = server.engine.assignment_history(&AssignmentId(id)).await?;
    Ok(Json(list(events)))
}
