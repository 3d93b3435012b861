//! In-process `Store` used by the test suite. Mirrors the Postgres schema's
//! ordering and cascade rules.

use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::store::Store;
use crate::models::{
    category::{Category, NewCategory},
    project::{NewProject, Project},
    section::{NewSection, Section},
    tag::{NewTag, Tag, TaskTag},
    task::{NewTask, ProjectFilter, Task, TaskFilter},
    user::{UpdateProfileRequest, User, UserCredentials},
};

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    categories: Vec<Category>,
    projects: Vec<Project>,
    sections: Vec<Section>,
    tags: Vec<Tag>,
    tasks: Vec<Task>,
    task_tags: Vec<(Uuid, Uuid)>,
    last_write: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps so created_at ordering is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_write {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_write = Some(now);
        now
    }

    fn owns_project(&self, user_id: Uuid, project_id: Uuid) -> bool {
        self.projects
            .iter()
            .any(|p| p.id == project_id && p.user_id == user_id)
    }

    fn remove_tasks(&mut self, doomed: &HashSet<Uuid>) {
        self.tasks.retain(|t| !doomed.contains(&t.id));
        self.task_tags.retain(|(task_id, _)| !doomed.contains(task_id));
    }

    fn remove_sections(&mut self, doomed: &HashSet<Uuid>) {
        self.sections.retain(|s| !doomed.contains(&s.id));
        let tasks: HashSet<Uuid> = self
            .tasks
            .iter()
            .filter(|t| t.section_id.is_some_and(|id| doomed.contains(&id)))
            .map(|t| t.id)
            .collect();
        self.remove_tasks(&tasks);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|err| err.into_inner())
    }
}

fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let t = self.lock();
        Ok(t.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<UserCredentials>> {
        let t = self.lock();
        Ok(t.users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                id: u.id,
                email: u.email.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        language: &str,
    ) -> anyhow::Result<User> {
        let mut t = self.lock();
        if t.users.iter().any(|(u, _)| u.email == email) {
            anyhow::bail!("duplicate key value violates unique constraint \"users_email_key\"");
        }
        let now = t.now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
            avatar: None,
            language: language.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.users.push((user.clone(), password_hash.to_string()));
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, patch: &UpdateProfileRequest) -> anyhow::Result<u64> {
        let mut t = self.lock();
        let now = t.now();
        let Some((user, _)) = t.users.iter_mut().find(|(u, _)| u.id == id) else {
            return Ok(0);
        };
        if let Some(name) = &patch.name {
            user.name = Some(name.clone());
        }
        if let Some(avatar) = &patch.avatar {
            user.avatar = Some(avatar.clone());
        }
        if let Some(language) = &patch.language {
            user.language = language.clone();
        }
        user.updated_at = now;
        Ok(1)
    }

    async fn list_categories(&self, user_id: Uuid) -> anyhow::Result<Vec<Category>> {
        let t = self.lock();
        let mut rows: Vec<Category> = t
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |c| c.created_at);
        Ok(rows)
    }

    async fn find_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Category>> {
        let t = self.lock();
        Ok(t.categories
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn find_default_category(&self, user_id: Uuid) -> anyhow::Result<Option<Category>> {
        let t = self.lock();
        Ok(t.categories
            .iter()
            .find(|c| c.user_id == user_id && c.is_default)
            .cloned())
    }

    async fn insert_category(&self, category: &NewCategory) -> anyhow::Result<Category> {
        let mut t = self.lock();
        let now = t.now();
        let row = Category {
            id: Uuid::new_v4(),
            user_id: category.user_id,
            name: category.name.clone(),
            color: category.color.clone(),
            is_default: false,
            created_at: now,
            updated_at: now,
        };
        t.categories.push(row.clone());
        Ok(row)
    }

    async fn insert_default_category(
        &self,
        category: &NewCategory,
    ) -> anyhow::Result<Option<Category>> {
        let mut t = self.lock();
        if t.categories
            .iter()
            .any(|c| c.user_id == category.user_id && c.is_default)
        {
            return Ok(None);
        }
        let now = t.now();
        let row = Category {
            id: Uuid::new_v4(),
            user_id: category.user_id,
            name: category.name.clone(),
            color: category.color.clone(),
            is_default: true,
            created_at: now,
            updated_at: now,
        };
        t.categories.push(row.clone());
        Ok(Some(row))
    }

    async fn save_category(&self, category: &Category) -> anyhow::Result<Category> {
        let mut t = self.lock();
        let now = t.now();
        let row = t
            .categories
            .iter_mut()
            .find(|c| c.id == category.id && c.user_id == category.user_id)
            .ok_or_else(|| anyhow::anyhow!("no rows returned by a query"))?;
        row.name = category.name.clone();
        row.color = category.color.clone();
        row.is_default = category.is_default;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let mut t = self.lock();
        let before = t.categories.len();
        t.categories.retain(|c| !(c.id == id && c.user_id == user_id));
        Ok((before - t.categories.len()) as u64)
    }

    async fn list_projects(
        &self,
        user_id: Uuid,
        is_favorite: Option<bool>,
    ) -> anyhow::Result<Vec<Project>> {
        let t = self.lock();
        let mut rows: Vec<Project> = t
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter(|p| is_favorite.map_or(true, |fav| p.is_favorite == fav))
            .cloned()
            .collect();
        newest_first(&mut rows, |p| p.created_at);
        Ok(rows)
    }

    async fn find_project(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Project>> {
        let t = self.lock();
        Ok(t.projects
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn find_projects_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Project>> {
        let t = self.lock();
        Ok(t.projects.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    async fn insert_project(&self, project: &NewProject) -> anyhow::Result<Project> {
        let mut t = self.lock();
        let now = t.now();
        let row = Project {
            id: Uuid::new_v4(),
            user_id: project.user_id,
            name: project.name.clone(),
            color: project.color.clone(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        t.projects.push(row.clone());
        Ok(row)
    }

    async fn save_project(&self, project: &Project) -> anyhow::Result<Project> {
        let mut t = self.lock();
        let now = t.now();
        let row = t
            .projects
            .iter_mut()
            .find(|p| p.id == project.id && p.user_id == project.user_id)
            .ok_or_else(|| anyhow::anyhow!("no rows returned by a query"))?;
        row.name = project.name.clone();
        row.color = project.color.clone();
        row.is_favorite = project.is_favorite;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let mut t = self.lock();
        if !t.owns_project(user_id, id) {
            return Ok(0);
        }
        t.projects.retain(|p| p.id != id);

        // sections cascade (and take their tasks with them)
        let sections: HashSet<Uuid> = t
            .sections
            .iter()
            .filter(|s| s.project_id == id)
            .map(|s| s.id)
            .collect();
        t.remove_sections(&sections);

        // remaining tasks fall back to the Inbox
        for task in t.tasks.iter_mut().filter(|task| task.project_id == Some(id)) {
            task.project_id = None;
        }
        Ok(1)
    }

    async fn list_sections(&self, project_ids: &[Uuid]) -> anyhow::Result<Vec<Section>> {
        let t = self.lock();
        let mut rows: Vec<Section> = t
            .sections
            .iter()
            .filter(|s| project_ids.contains(&s.project_id))
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.order, s.created_at));
        Ok(rows)
    }

    async fn find_section(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Section>> {
        let t = self.lock();
        Ok(t.sections
            .iter()
            .find(|s| s.id == id && t.owns_project(user_id, s.project_id))
            .cloned())
    }

    async fn find_sections_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Section>> {
        let t = self.lock();
        Ok(t.sections.iter().filter(|s| ids.contains(&s.id)).cloned().collect())
    }

    async fn max_section_order(&self, project_id: Uuid) -> anyhow::Result<Option<i32>> {
        let t = self.lock();
        Ok(t.sections
            .iter()
            .filter(|s| s.project_id == project_id)
            .map(|s| s.order)
            .max())
    }

    async fn insert_section(&self, section: &NewSection) -> anyhow::Result<Section> {
        let mut t = self.lock();
        let now = t.now();
        let row = Section {
            id: Uuid::new_v4(),
            project_id: section.project_id,
            name: section.name.clone(),
            order: section.order,
            created_at: now,
            updated_at: now,
        };
        t.sections.push(row.clone());
        Ok(row)
    }

    async fn save_section(&self, section: &Section) -> anyhow::Result<Section> {
        let mut t = self.lock();
        let now = t.now();
        let row = t
            .sections
            .iter_mut()
            .find(|s| s.id == section.id)
            .ok_or_else(|| anyhow::anyhow!("no rows returned by a query"))?;
        row.name = section.name.clone();
        row.order = section.order;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn set_section_orders(
        &self,
        project_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> anyhow::Result<()> {
        let mut t = self.lock();
        let now = t.now();
        for &(id, order) in orders {
            if let Some(row) = t
                .sections
                .iter_mut()
                .find(|s| s.id == id && s.project_id == project_id)
            {
                row.order = order;
                row.updated_at = now;
            }
        }
        Ok(())
    }

    async fn delete_section(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let mut t = self.lock();
        let owned = t
            .sections
            .iter()
            .any(|s| s.id == id && t.owns_project(user_id, s.project_id));
        if !owned {
            return Ok(0);
        }
        t.remove_sections(&HashSet::from([id]));
        Ok(1)
    }

    async fn list_tags(&self, user_id: Uuid) -> anyhow::Result<Vec<Tag>> {
        let t = self.lock();
        let mut rows: Vec<Tag> = t.tags.iter().filter(|g| g.user_id == user_id).cloned().collect();
        newest_first(&mut rows, |g| g.created_at);
        Ok(rows)
    }

    async fn find_tag(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Tag>> {
        let t = self.lock();
        Ok(t.tags
            .iter()
            .find(|g| g.id == id && g.user_id == user_id)
            .cloned())
    }

    async fn find_tags_by_ids(
        &self,
        ids: &[Uuid],
        user_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<Tag>> {
        let t = self.lock();
        Ok(t.tags
            .iter()
            .filter(|g| ids.contains(&g.id))
            .filter(|g| user_id.map_or(true, |owner| g.user_id == owner))
            .cloned()
            .collect())
    }

    async fn insert_tag(&self, tag: &NewTag) -> anyhow::Result<Tag> {
        let mut t = self.lock();
        let now = t.now();
        let row = Tag {
            id: Uuid::new_v4(),
            user_id: tag.user_id,
            name: tag.name.clone(),
            color: tag.color.clone(),
            created_at: now,
            updated_at: now,
        };
        t.tags.push(row.clone());
        Ok(row)
    }

    async fn save_tag(&self, tag: &Tag) -> anyhow::Result<Tag> {
        let mut t = self.lock();
        let now = t.now();
        let row = t
            .tags
            .iter_mut()
            .find(|g| g.id == tag.id && g.user_id == tag.user_id)
            .ok_or_else(|| anyhow::anyhow!("no rows returned by a query"))?;
        row.name = tag.name.clone();
        row.color = tag.color.clone();
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_tag(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let mut t = self.lock();
        let before = t.tags.len();
        t.tags.retain(|g| !(g.id == id && g.user_id == user_id));
        let affected = (before - t.tags.len()) as u64;
        if affected > 0 {
            t.task_tags.retain(|(_, tag_id)| *tag_id != id);
        }
        Ok(affected)
    }

    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> anyhow::Result<Vec<Task>> {
        let t = self.lock();
        let mut rows: Vec<Task> = t
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .filter(|task| match filter.project {
                ProjectFilter::Unfiltered => true,
                ProjectFilter::InboxOnly => task.project_id.is_none(),
                ProjectFilter::Project(id) => task.project_id == Some(id),
            })
            .filter(|task| filter.due_date.is_none() || task.due_date == filter.due_date)
            .cloned()
            .collect();
        newest_first(&mut rows, |task| task.created_at);
        Ok(rows)
    }

    async fn list_tasks_in_projects(&self, project_ids: &[Uuid]) -> anyhow::Result<Vec<Task>> {
        let t = self.lock();
        let mut rows: Vec<Task> = t
            .tasks
            .iter()
            .filter(|task| task.project_id.is_some_and(|id| project_ids.contains(&id)))
            .cloned()
            .collect();
        newest_first(&mut rows, |task| task.created_at);
        Ok(rows)
    }

    async fn list_tasks_in_sections(&self, section_ids: &[Uuid]) -> anyhow::Result<Vec<Task>> {
        let t = self.lock();
        let mut rows: Vec<Task> = t
            .tasks
            .iter()
            .filter(|task| task.section_id.is_some_and(|id| section_ids.contains(&id)))
            .cloned()
            .collect();
        rows.sort_by_key(|task| task.created_at);
        Ok(rows)
    }

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>> {
        let t = self.lock();
        Ok(t.tasks
            .iter()
            .find(|task| task.id == id && task.user_id == user_id)
            .cloned())
    }

    async fn insert_task(&self, task: &NewTask) -> anyhow::Result<Task> {
        let mut t = self.lock();
        let now = t.now();
        let row = Task {
            id: Uuid::new_v4(),
            user_id: task.user_id,
            project_id: task.project_id,
            section_id: task.section_id,
            title: task.title.clone(),
            description: task.description.clone(),
            is_completed: false,
            due_date: task.due_date,
            priority: task.priority.map(|p| p.as_str().to_string()),
            created_at: now,
            updated_at: now,
        };
        t.tasks.push(row.clone());
        Ok(row)
    }

    async fn save_task(&self, task: &Task) -> anyhow::Result<Task> {
        let mut t = self.lock();
        let now = t.now();
        let row = t
            .tasks
            .iter_mut()
            .find(|row| row.id == task.id && row.user_id == task.user_id)
            .ok_or_else(|| anyhow::anyhow!("no rows returned by a query"))?;
        *row = Task {
            created_at: row.created_at,
            updated_at: now,
            ..task.clone()
        };
        Ok(row.clone())
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let mut t = self.lock();
        let owned = t.tasks.iter().any(|task| task.id == id && task.user_id == user_id);
        if !owned {
            return Ok(0);
        }
        t.remove_tasks(&HashSet::from([id]));
        Ok(1)
    }

    async fn task_tags(&self, task_ids: &[Uuid]) -> anyhow::Result<Vec<TaskTag>> {
        let t = self.lock();
        let mut rows: Vec<TaskTag> = t
            .task_tags
            .iter()
            .filter(|(task_id, _)| task_ids.contains(task_id))
            .filter_map(|(task_id, tag_id)| {
                t.tags.iter().find(|g| g.id == *tag_id).map(|tag| TaskTag {
                    task_id: *task_id,
                    tag: tag.clone(),
                })
            })
            .collect();
        newest_first(&mut rows, |row| row.tag.created_at);
        Ok(rows)
    }

    async fn replace_task_tags(&self, task_id: Uuid, tag_ids: &[Uuid]) -> anyhow::Result<()> {
        let mut t = self.lock();
        t.task_tags.retain(|(id, _)| *id != task_id);
        let mut seen = HashSet::new();
        for tag_id in tag_ids {
            if seen.insert(*tag_id) {
                t.task_tags.push((task_id, *tag_id));
            }
        }
        Ok(())
    }
}
