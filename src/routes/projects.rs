use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        auth::Principal,
        project::{
            CreateProjectRequest, Project, ProjectListQuery, ProjectWithRelations,
            UpdateProjectRequest,
        },
    },
    services::projects::ProjectService,
    AppState,
};

/// `?isFavorite=true|false`; any other value lists everything.
pub async fn list_projects(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> Result<Json<Vec<ProjectWithRelations>>, AppError> {
    let projects =
        ProjectService::list(state.store.as_ref(), principal.id, query.favorite_filter()).await?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ProjectWithRelations>, AppError> {
    Ok(Json(ProjectService::get(state.store.as_ref(), principal.id, id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = ProjectService::create(state.store.as_ref(), principal.id, &body).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    let project = ProjectService::update(state.store.as_ref(), principal.id, id, &body).await?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    ProjectService::delete(state.store.as_ref(), principal.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
