use uuid::Uuid;

use super::{auth::AuthService, avatar::default_avatar, categories::CategoryService};
use crate::{
    db::Store,
    error::AppError,
    models::{
        auth::Principal,
        user::{RegisteredUser, UpdateProfileRequest, User, DEFAULT_LANGUAGE},
    },
};

const MIN_PASSWORD_LEN: usize = 6;
const MAX_LANGUAGE_LEN: usize = 10;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserService;

impl UserService {
    pub async fn get(store: &dyn Store, id: Uuid) -> Result<User, AppError> {
        store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn update_profile(
        store: &dyn Store,
        id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<User, AppError> {
        if let Some(language) = &req.language {
            if language.trim().is_empty() || language.len() > MAX_LANGUAGE_LEN {
                return Err(AppError::Validation("Invalid language".into()));
            }
        }

        if store.update_user(id, req).await? == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Self::get(store, id).await
    }

    /// Create the account, its avatar and its default category. No token is
    /// issued here.
    pub async fn register(
        store: &dyn Store,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, AppError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("A valid email is required".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if store.find_credentials_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = AuthService::hash_password(password)?;
        let user = store
            .insert_user(&email, &password_hash, DEFAULT_LANGUAGE)
            .await?;

        let avatar = UpdateProfileRequest {
            avatar: Some(default_avatar(user.id)),
            ..Default::default()
        };
        store.update_user(user.id, &avatar).await?;
        CategoryService::ensure_default(store, user.id).await?;

        tracing::info!("Registered user {}", user.id);
        Ok(RegisteredUser {
            id: user.id,
            email: user.email,
        })
    }

    pub async fn authenticate(
        store: &dyn Store,
        email: &str,
        password: &str,
    ) -> Result<Principal, AppError> {
        let invalid = || AppError::Unauthorized("Invalid credentials".into());

        let credentials = store
            .find_credentials_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;

        if !AuthService::verify_password(password, &credentials.password_hash) {
            tracing::warn!("Failed login for user {}", credentials.id);
            return Err(invalid());
        }

        Ok(Principal {
            id: credentials.id,
            email: credentials.email,
        })
    }
}
