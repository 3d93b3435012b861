use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::{projects::ProjectService, tasks::TaskService};
use crate::{
    db::Store,
    error::AppError,
    models::{
        section::{
            CreateSectionRequest, NewSection, ReorderSectionsRequest, Section, SectionWithTasks,
            UpdateSectionRequest,
        },
        task::TaskDetail,
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Section not found".into())
}

fn check_order(order: i32) -> Result<(), AppError> {
    if order < 0 {
        return Err(AppError::Validation("Section order must be >= 0".into()));
    }
    Ok(())
}

/// Sections have no owner column; every operation checks the principal
/// against the owning project.
pub struct SectionService;

impl SectionService {
    pub async fn list_by_project(
        store: &dyn Store,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<SectionWithTasks>, AppError> {
        ProjectService::require_owned(store, user_id, project_id).await?;
        let sections = store.list_sections(&[project_id]).await?;
        Self::with_tasks(store, sections).await
    }

    pub async fn get(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<SectionWithTasks, AppError> {
        let section = store.find_section(user_id, id).await?.ok_or_else(not_found)?;
        Self::with_tasks(store, vec![section])
            .await?
            .pop()
            .ok_or_else(not_found)
    }

    /// New sections go to the end: `max(order) + 1`, or 0 for the first one.
    pub async fn create(
        store: &dyn Store,
        user_id: Uuid,
        req: &CreateSectionRequest,
    ) -> Result<Section, AppError> {
        ProjectService::require_owned(store, user_id, req.project_id).await?;

        let order = store
            .max_section_order(req.project_id)
            .await?
            .map_or(0, |max| max + 1);
        let section = store
            .insert_section(&NewSection {
                project_id: req.project_id,
                name: req.name.clone(),
                order,
            })
            .await?;
        tracing::info!(
            "Created section {} (order {}) in project {}",
            section.id,
            order,
            req.project_id
        );
        Ok(section)
    }

    pub async fn update(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateSectionRequest,
    ) -> Result<Section, AppError> {
        let mut section = store.find_section(user_id, id).await?.ok_or_else(not_found)?;

        if let Some(name) = &req.name {
            section.name = name.clone();
        }
        if let Some(order) = req.order {
            check_order(order)?;
            section.order = order;
        }

        Ok(store.save_section(&section).await?)
    }

    /// Tasks inside the section are deleted with it.
    pub async fn delete(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if store.delete_section(user_id, id).await? == 0 {
            return Err(not_found());
        }
        tracing::info!("Deleted section {} for user {}", id, user_id);
        Ok(())
    }

    /// Apply `{id, order}` pairs to the project's sections. Ids that are not
    /// sections of this project are ignored. Re-running the same input is a
    /// no-op.
    pub async fn reorder(
        store: &dyn Store,
        user_id: Uuid,
        req: &ReorderSectionsRequest,
    ) -> Result<Vec<SectionWithTasks>, AppError> {
        ProjectService::require_owned(store, user_id, req.project_id).await?;

        let known: HashSet<Uuid> = store
            .list_sections(&[req.project_id])
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let mut orders = Vec::with_capacity(req.section_orders.len());
        for entry in req.section_orders.iter().filter(|e| known.contains(&e.id)) {
            check_order(entry.order)?;
            orders.push((entry.id, entry.order));
        }

        if !orders.is_empty() {
            store.set_section_orders(req.project_id, &orders).await?;
            tracing::info!(
                "Reordered {} sections in project {}",
                orders.len(),
                req.project_id
            );
        }

        Self::list_by_project(store, user_id, req.project_id).await
    }

    async fn with_tasks(
        store: &dyn Store,
        sections: Vec<Section>,
    ) -> Result<Vec<SectionWithTasks>, AppError> {
        if sections.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = sections.iter().map(|s| s.id).collect();

        let tasks = store.list_tasks_in_sections(&ids).await?;
        let mut by_section: HashMap<Uuid, Vec<TaskDetail>> = HashMap::new();
        for detail in TaskService::hydrate(store, tasks).await? {
            if let Some(section_id) = detail.task.section_id {
                by_section.entry(section_id).or_default().push(detail);
            }
        }

        Ok(sections
            .into_iter()
            .map(|section| {
                let mut tasks = by_section.remove(&section.id).unwrap_or_default();
                tasks.sort_by_key(|t| t.task.created_at);
                SectionWithTasks { section, tasks }
            })
            .collect())
    }
}
