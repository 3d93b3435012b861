use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        auth::Principal,
        task::{CreateTaskRequest, TaskDetail, TaskFilter, TaskListQuery, UpdateTaskRequest},
    },
    services::tasks::TaskService,
    AppState,
};

fn require_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    Ok(())
}

/// `?projectId=` (absent: everything, `null`: Inbox only, id: that project)
/// and `?dueDate=` (matched on the calendar day).
pub async fn list_tasks(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<Vec<TaskDetail>>, AppError> {
    let filter = TaskFilter::try_from(query)?;
    Ok(Json(TaskService::list(state.store.as_ref(), principal.id, &filter).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TaskDetail>, AppError> {
    Ok(Json(TaskService::get(state.store.as_ref(), principal.id, id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskDetail>), AppError> {
    require_title(&body.title)?;
    let task = TaskService::create(state.store.as_ref(), principal.id, &body).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskDetail>, AppError> {
    if let Some(title) = &body.title {
        require_title(title)?;
    }
    Ok(Json(TaskService::update(state.store.as_ref(), principal.id, id, &body).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    TaskService::delete(state.store.as_ref(), principal.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
