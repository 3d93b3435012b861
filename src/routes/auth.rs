use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppError,
    middleware::extract::ApiJson,
    models::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        user::RegisteredUser,
    },
    services::{auth::AuthService, users::UserService},
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), AppError> {
    let user = UserService::register(state.store.as_ref(), &body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let principal =
        UserService::authenticate(state.store.as_ref(), &body.email, &body.password).await?;
    let token = AuthService::issue_token(
        &principal,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )?;
    tracing::info!("User {} logged in", principal.id);
    Ok(Json(LoginResponse { token }))
}
