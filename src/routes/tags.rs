use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::extract::{ApiJson, ApiPath},
    models::{
        auth::Principal,
        tag::{CreateTagRequest, Tag, UpdateTagRequest},
    },
    services::tags::TagService,
    AppState,
};

pub async fn list_tags(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<Tag>>, AppError> {
    Ok(Json(TagService::list(state.store.as_ref(), principal.id).await?))
}

pub async fn get_tag(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Tag>, AppError> {
    Ok(Json(TagService::get(state.store.as_ref(), principal.id, id).await?))
}

pub async fn create_tag(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let tag = TagService::create(state.store.as_ref(), principal.id, &body).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn update_tag(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateTagRequest>,
) -> Result<Json<Tag>, AppError> {
    Ok(Json(TagService::update(state.store.as_ref(), principal.id, id, &body).await?))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    TagService::delete(state.store.as_ref(), principal.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
