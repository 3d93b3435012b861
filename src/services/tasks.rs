use std::collections::HashMap;

use uuid::Uuid;

use super::tags::TagService;
use crate::{
    db::Store,
    error::AppError,
    models::{
        apply_nullable,
        project::Project,
        section::Section,
        tag::Tag,
        task::{
            parse_calendar_date, CreateTaskRequest, NewTask, Task, TaskDetail, TaskFilter,
            UpdateTaskRequest,
        },
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub struct TaskService;

impl TaskService {
    /// Newest first, with tags, project and section attached.
    pub async fn list(
        store: &dyn Store,
        user_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<TaskDetail>, AppError> {
        let tasks = store.list_tasks(user_id, filter).await?;
        Self::hydrate(store, tasks).await
    }

    pub async fn get(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<TaskDetail, AppError> {
        let task = store.find_task(user_id, id).await?.ok_or_else(not_found)?;
        Self::hydrate(store, vec![task]).await?.pop().ok_or_else(not_found)
    }

    /// Foreign tag ids are dropped silently. The result is re-read with its
    /// relations.
    pub async fn create(
        store: &dyn Store,
        user_id: Uuid,
        req: &CreateTaskRequest,
    ) -> Result<TaskDetail, AppError> {
        Self::check_references(store, user_id, req.project_id, req.section_id).await?;
        let due_date = req
            .due_date
            .as_deref()
            .map(parse_calendar_date)
            .transpose()?;

        let task = store
            .insert_task(&NewTask {
                user_id,
                project_id: req.project_id,
                section_id: req.section_id,
                title: req.title.clone(),
                description: req.description.clone(),
                due_date,
                priority: req.priority,
            })
            .await?;

        if let Some(tag_ids) = req.tag_ids.as_deref().filter(|ids| !ids.is_empty()) {
            Self::set_tags(store, user_id, task.id, tag_ids).await?;
        }
        tracing::info!("Created task {} for user {}", task.id, user_id);

        Self::get(store, user_id, task.id).await
    }

    /// Merge the patch and persist the whole row. `tagIds`, when present,
    /// replaces the tag set (`[]` clears it).
    pub async fn update(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateTaskRequest,
    ) -> Result<TaskDetail, AppError> {
        let mut task = store.find_task(user_id, id).await?.ok_or_else(not_found)?;

        let project_id = req.project_id.flatten();
        let section_id = req.section_id.flatten();
        Self::check_references(store, user_id, project_id, section_id).await?;

        if let Some(title) = &req.title {
            task.title = title.clone();
        }
        apply_nullable(&mut task.description, &req.description);
        if let Some(is_completed) = req.is_completed {
            task.is_completed = is_completed;
        }
        if let Some(due_date) = &req.due_date {
            task.due_date = due_date.as_deref().map(parse_calendar_date).transpose()?;
        }
        if let Some(priority) = req.priority {
            task.priority = priority.map(|p| p.as_str().to_string());
        }
        apply_nullable(&mut task.project_id, &req.project_id);
        apply_nullable(&mut task.section_id, &req.section_id);

        store.save_task(&task).await?;

        if let Some(tag_ids) = &req.tag_ids {
            Self::set_tags(store, user_id, task.id, tag_ids).await?;
        }

        Self::get(store, user_id, task.id).await
    }

    pub async fn delete(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if store.delete_task(user_id, id).await? == 0 {
            return Err(not_found());
        }
        tracing::info!("Deleted task {} for user {}", id, user_id);
        Ok(())
    }

    /// Attach tags, project and section to a batch of tasks, preserving order.
    pub async fn hydrate(store: &dyn Store, tasks: Vec<Task>) -> Result<Vec<TaskDetail>, AppError> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in store.task_tags(&task_ids).await? {
            tags.entry(row.task_id).or_default().push(row.tag);
        }

        let mut project_ids: Vec<Uuid> = tasks.iter().filter_map(|t| t.project_id).collect();
        project_ids.sort_unstable();
        project_ids.dedup();
        let projects: HashMap<Uuid, Project> = if project_ids.is_empty() {
            HashMap::new()
        } else {
            store
                .find_projects_by_ids(&project_ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        let mut section_ids: Vec<Uuid> = tasks.iter().filter_map(|t| t.section_id).collect();
        section_ids.sort_unstable();
        section_ids.dedup();
        let sections: HashMap<Uuid, Section> = if section_ids.is_empty() {
            HashMap::new()
        } else {
            store
                .find_sections_by_ids(&section_ids)
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()
        };

        Ok(tasks
            .into_iter()
            .map(|task| TaskDetail {
                tags: tags.remove(&task.id).unwrap_or_default(),
                project: task.project_id.and_then(|id| projects.get(&id).cloned()),
                section: task.section_id.and_then(|id| sections.get(&id).cloned()),
                task,
            })
            .collect())
    }

    async fn set_tags(
        store: &dyn Store,
        user_id: Uuid,
        task_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), AppError> {
        let resolved = TagService::resolve_by_ids(store, tag_ids, Some(user_id)).await?;
        let ids: Vec<Uuid> = resolved.iter().map(|t| t.id).collect();
        store.replace_task_tags(task_id, &ids).await?;
        Ok(())
    }

    /// A referenced project or section must belong to the principal.
    async fn check_references(
        store: &dyn Store,
        user_id: Uuid,
        project_id: Option<Uuid>,
        section_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(project_id) = project_id {
            if store.find_project(user_id, project_id).await?.is_none() {
                return Err(AppError::NotFound("Project not found".into()));
            }
        }
        if let Some(section_id) = section_id {
            if store.find_section(user_id, section_id).await?.is_none() {
                return Err(AppError::NotFound("Section not found".into()));
            }
        }
        Ok(())
    }
}
