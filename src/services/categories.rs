use uuid::Uuid;

use crate::{
    db::Store,
    error::AppError,
    models::{
        apply_nullable,
        category::{
            Category, CreateCategoryRequest, NewCategory, UpdateCategoryRequest,
            DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_NAME,
        },
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Category not found".into())
}

pub struct CategoryService;

impl CategoryService {
    pub async fn list(store: &dyn Store, user_id: Uuid) -> Result<Vec<Category>, AppError> {
        Ok(store.list_categories(user_id).await?)
    }

    pub async fn get(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Category, AppError> {
        store.find_category(user_id, id).await?.ok_or_else(not_found)
    }

    /// Categories created here are never the default one.
    pub async fn create(
        store: &dyn Store,
        user_id: Uuid,
        req: &CreateCategoryRequest,
    ) -> Result<Category, AppError> {
        let category = store
            .insert_category(&NewCategory {
                user_id,
                name: req.name.clone(),
                color: req.color.clone(),
            })
            .await?;
        tracing::info!("Created category {} for user {}", category.id, user_id);
        Ok(category)
    }

    /// The default flag is fixed once established: it can be neither cleared on
    /// the default category nor set (to any value) on another one.
    pub async fn update(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        let mut category = store.find_category(user_id, id).await?.ok_or_else(not_found)?;

        match (category.is_default, req.is_default) {
            (true, Some(false)) => {
                return Err(AppError::InvalidOperation(
                    "Cannot modify default category".into(),
                ))
            }
            (false, Some(_)) => {
                return Err(AppError::InvalidOperation(
                    "Cannot set isDefault on non-default categories".into(),
                ))
            }
            _ => {}
        }

        if let Some(name) = &req.name {
            category.name = name.clone();
        }
        apply_nullable(&mut category.color, &req.color);

        Ok(store.save_category(&category).await?)
    }

    pub async fn delete(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let category = store.find_category(user_id, id).await?.ok_or_else(not_found)?;
        if category.is_default {
            return Err(AppError::InvalidOperation(
                "Cannot delete default category".into(),
            ));
        }

        if store.delete_category(user_id, id).await? == 0 {
            return Err(not_found());
        }
        tracing::info!("Deleted category {} for user {}", id, user_id);
        Ok(())
    }

    /// Idempotent: returns the user's default category, creating it if missing.
    pub async fn ensure_default(store: &dyn Store, user_id: Uuid) -> Result<Category, AppError> {
        if let Some(existing) = store.find_default_category(user_id).await? {
            return Ok(existing);
        }

        let new = NewCategory {
            user_id,
            name: DEFAULT_CATEGORY_NAME.into(),
            color: Some(DEFAULT_CATEGORY_COLOR.into()),
        };
        match store.insert_default_category(&new).await? {
            Some(created) => {
                tracing::info!("Created default category for user {}", user_id);
                Ok(created)
            }
            // Lost a race with a concurrent bootstrap; use the winner.
            None => store
                .find_default_category(user_id)
                .await?
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("default category vanished"))),
        }
    }
}
