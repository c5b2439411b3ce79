use axum::extract::State;
use deeds_storage::TemplateId;
use uuid::Uuid;

use super::ApiResult;
use crate::api::{
    list, CreateTemplateRequest, SetTemplateActiveRequest, TemplateResponse, TemplatesQuery,
};
use crate::extract::{Json, Path, Query};
use crate::server::DeedsServer;

/// Active templates, or all of them with `?all=true`.
pub async fn list_templates(
    State(server): State<DeedsServer>,
    Query(q): Query<TemplatesQuery>,
) -> ApiResult<Vec<TemplateResponse>> {
    let active_only = !q.all.unwrap_or(false);
    let templates = server.engine.list_templates(active_only).await?;
    Ok(Json(list(templates)))
}

pub async fn create_template(
    State(server): State<DeedsServer>,
    Json(req): Json<CreateTemplateRequest>,
) -> ApiResult<TemplateResponse> {
    let template = server.engine.create_template(&req.description).await?;
    Ok(Json(template.into()))
}

pub async fn set_active(
    State(server): State<DeedsServer>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetTemplateActiveRequest>,
) -> ApiResult<TemplateResponse> {
    let template = server
        .engine
        .set_template_active(&TemplateId(id), req.active)
        .await?;
    Ok(Json(template.into()))
}
