use axum::{extract::State, Json};

use crate::{
    error::AppError,
    middleware::extract::ApiJson,
    models::{
        auth::Principal,
        user::{UpdateProfileRequest, User},
    },
    services::users::UserService,
    AppState,
};

pub async fn me(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::get(state.store.as_ref(), principal.id).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update_profile(state.store.as_ref(), principal.id, &body).await?;
    Ok(Json(user))
}
