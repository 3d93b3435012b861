use uuid::Uuid;

use crate::{
    db::Store,
    error::AppError,
    models::{
        apply_nullable,
        tag::{CreateTagRequest, NewTag, Tag, UpdateTagRequest},
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Tag not found".into())
}

pub struct TagService;

impl TagService {
    pub async fn list(store: &dyn Store, user_id: Uuid) -> Result<Vec<Tag>, AppError> {
        Ok(store.list_tags(user_id).await?)
    }

    pub async fn get(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<Tag, AppError> {
        store.find_tag(user_id, id).await?.ok_or_else(not_found)
    }

    pub async fn create(
        store: &dyn Store,
        user_id: Uuid,
        req: &CreateTagRequest,
    ) -> Result<Tag, AppError> {
        let tag = store
            .insert_tag(&NewTag {
                user_id,
                name: req.name.clone(),
                color: req.color.clone(),
            })
            .await?;
        tracing::info!("Created tag {} for user {}", tag.id, user_id);
        Ok(tag)
    }

    pub async fn update(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateTagRequest,
    ) -> Result<Tag, AppError> {
        let mut tag = store.find_tag(user_id, id).await?.ok_or_else(not_found)?;
        if let Some(name) = &req.name {
            tag.name = name.clone();
        }
        apply_nullable(&mut tag.color, &req.color);
        Ok(store.save_tag(&tag).await?)
    }

    pub async fn delete(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if store.delete_tag(user_id, id).await? == 0 {
            return Err(not_found());
        }
        tracing::info!("Deleted tag {} for user {}", id, user_id);
        Ok(())
    }

    /// Resolve tag ids to rows. With an owner, ids belonging to anyone else are
    /// silently dropped.
    pub async fn resolve_by_ids(
        store: &dyn Store,
        ids: &[Uuid],
        owner: Option<Uuid>,
    ) -> Result<Vec<Tag>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(store.find_tags_by_ids(ids, owner).await?)
    }
}
