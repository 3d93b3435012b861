use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::extract::{ApiJson, ApiPath},
    models::{
        auth::Principal,
        section::{
            CreateSectionRequest, ReorderSectionsRequest, Section, SectionWithTasks,
            UpdateSectionRequest,
        },
    },
    services::sections::SectionService,
    AppState,
};

pub async fn list_project_sections(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(project_id): ApiPath<Uuid>,
) -> Result<Json<Vec<SectionWithTasks>>, AppError> {
    let sections =
        SectionService::list_by_project(state.store.as_ref(), principal.id, project_id).await?;
    Ok(Json(sections))
}

pub async fn get_section(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SectionWithTasks>, AppError> {
    Ok(Json(SectionService::get(state.store.as_ref(), principal.id, id).await?))
}

pub async fn create_section(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<CreateSectionRequest>,
) -> Result<(StatusCode, Json<Section>), AppError> {
    let section = SectionService::create(state.store.as_ref(), principal.id, &body).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

pub async fn update_section(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateSectionRequest>,
) -> Result<Json<Section>, AppError> {
    let section = SectionService::update(state.store.as_ref(), principal.id, id, &body).await?;
    Ok(Json(section))
}

pub async fn delete_section(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    SectionService::delete(state.store.as_ref(), principal.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_sections(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<ReorderSectionsRequest>,
) -> Result<Json<Vec<SectionWithTasks>>, AppError> {
    let sections = SectionService::reorder(state.store.as_ref(), principal.id, &body).await?;
    Ok(Json(sections))
}
