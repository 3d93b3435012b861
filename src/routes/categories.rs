use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::extract::{ApiJson, ApiPath},
    models::{
        auth::Principal,
        category::{Category, CreateCategoryRequest, UpdateCategoryRequest},
    },
    services::categories::CategoryService,
    AppState,
};

pub async fn list_categories(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(CategoryService::list(state.store.as_ref(), principal.id).await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(CategoryService::get(state.store.as_ref(), principal.id, id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CategoryService::create(state.store.as_ref(), principal.id, &body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryService::update(state.store.as_ref(), principal.id, id, &body).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    CategoryService::delete(state.store.as_ref(), principal.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
