use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::Store,
    error::AppError,
    models::{
        apply_nullable,
        project::{
            CreateProjectRequest, NewProject, Project, ProjectWithRelations, UpdateProjectRequest,
        },
        section::Section,
        task::Task,
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Project not found".into())
}

pub struct ProjectService;

impl ProjectService {
    pub async fn list(
        store: &dyn Store,
        user_id: Uuid,
        is_favorite: Option<bool>,
    ) -> Result<Vec<ProjectWithRelations>, AppError> {
        let projects = store.list_projects(user_id, is_favorite).await?;
        Self::with_relations(store, projects).await
    }

    pub async fn get(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<ProjectWithRelations, AppError> {
        let project = Self::require_owned(store, user_id, id).await?;
        Self::with_relations(store, vec![project])
            .await?
            .pop()
            .ok_or_else(not_found)
    }

    /// Load a project the user owns, or `NotFound`.
    pub async fn require_owned(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Project, AppError> {
        store.find_project(user_id, id).await?.ok_or_else(not_found)
    }

    pub async fn create(
        store: &dyn Store,
        user_id: Uuid,
        req: &CreateProjectRequest,
    ) -> Result<Project, AppError> {
        let project = store
            .insert_project(&NewProject {
                user_id,
                name: req.name.clone(),
                color: req.color.clone(),
            })
            .await?;
        tracing::info!("Created project {} for user {}", project.id, user_id);
        Ok(project)
    }

    pub async fn update(
        store: &dyn Store,
        user_id: Uuid,
        id: Uuid,
        req: &UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let mut project = Self::require_owned(store, user_id, id).await?;

        if let Some(name) = &req.name {
            project.name = name.clone();
        }
        apply_nullable(&mut project.color, &req.color);
        if let Some(is_favorite) = req.is_favorite {
            project.is_favorite = is_favorite;
        }

        Ok(store.save_project(&project).await?)
    }

    /// Sections (and the tasks inside them) go with the project; other tasks
    /// move to the Inbox.
    pub async fn delete(store: &dyn Store, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if store.delete_project(user_id, id).await? == 0 {
            return Err(not_found());
        }
        tracing::info!("Deleted project {} for user {}", id, user_id);
        Ok(())
    }

    async fn with_relations(
        store: &dyn Store,
        projects: Vec<Project>,
    ) -> Result<Vec<ProjectWithRelations>, AppError> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();

        let mut tasks: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in store.list_tasks_in_projects(&ids).await? {
            if let Some(project_id) = task.project_id {
                tasks.entry(project_id).or_default().push(task);
            }
        }

        let mut sections: HashMap<Uuid, Vec<Section>> = HashMap::new();
        for section in store.list_sections(&ids).await? {
            sections.entry(section.project_id).or_default().push(section);
        }

        Ok(projects
            .into_iter()
            .map(|project| ProjectWithRelations {
                tasks: tasks.remove(&project.id).unwrap_or_default(),
                sections: sections.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect())
    }
}
