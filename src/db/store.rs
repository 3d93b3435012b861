//! Repository-style access to the relational store.
//!
//! Every method is a single logical read or write; ownership rules and
//! cross-entity invariants live in `services`, not here. Methods taking a
//! `user_id` scope their filter to that owner.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    category::{Category, NewCategory},
    project::{NewProject, Project},
    section::{NewSection, Section},
    tag::{NewTag, Tag, TaskTag},
    task::{NewTask, Task, TaskFilter},
    user::{UpdateProfileRequest, User, UserCredentials},
};

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_credentials_by_email(&self, email: &str)
        -> anyhow::Result<Option<UserCredentials>>;
    async fn insert_user(&self, email: &str, password_hash: &str, language: &str)
        -> anyhow::Result<User>;
    /// Absent fields are left unchanged. Returns the affected row count.
    async fn update_user(&self, id: Uuid, patch: &UpdateProfileRequest) -> anyhow::Result<u64>;

    // Categories
    async fn list_categories(&self, user_id: Uuid) -> anyhow::Result<Vec<Category>>;
    async fn find_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Category>>;
    async fn find_default_category(&self, user_id: Uuid) -> anyhow::Result<Option<Category>>;
    async fn insert_category(&self, category: &NewCategory) -> anyhow::Result<Category>;
    /// Insert the owner's default category unless one already exists.
    /// Returns `None` when another default won.
    async fn insert_default_category(&self, category: &NewCategory)
        -> anyhow::Result<Option<Category>>;
    async fn save_category(&self, category: &Category) -> anyhow::Result<Category>;
    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64>;

    // Projects
    async fn list_projects(&self, user_id: Uuid, is_favorite: Option<bool>)
        -> anyhow::Result<Vec<Project>>;
    async fn find_project(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Project>>;
    async fn find_projects_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Project>>;
    async fn insert_project(&self, project: &NewProject) -> anyhow::Result<Project>;
    async fn save_project(&self, project: &Project) -> anyhow::Result<Project>;
    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64>;

    // Sections (owned through their project)
    /// Ordered by `order` ascending.
    async fn list_sections(&self, project_ids: &[Uuid]) -> anyhow::Result<Vec<Section>>;
    async fn find_section(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Section>>;
    async fn find_sections_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Section>>;
    async fn max_section_order(&self, project_id: Uuid) -> anyhow::Result<Option<i32>>;
    async fn insert_section(&self, section: &NewSection) -> anyhow::Result<Section>;
    async fn save_section(&self, section: &Section) -> anyhow::Result<Section>;
    async fn set_section_orders(&self, project_id: Uuid, orders: &[(Uuid, i32)])
        -> anyhow::Result<()>;
    async fn delete_section(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64>;

    // Tags
    async fn list_tags(&self, user_id: Uuid) -> anyhow::Result<Vec<Tag>>;
    async fn find_tag(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Tag>>;
    async fn find_tags_by_ids(&self, ids: &[Uuid], user_id: Option<Uuid>)
        -> anyhow::Result<Vec<Tag>>;
    async fn insert_tag(&self, tag: &NewTag) -> anyhow::Result<Tag>;
    async fn save_tag(&self, tag: &Tag) -> anyhow::Result<Tag>;
    async fn delete_tag(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64>;

    // Tasks
    /// Newest first.
    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> anyhow::Result<Vec<Task>>;
    async fn list_tasks_in_projects(&self, project_ids: &[Uuid]) -> anyhow::Result<Vec<Task>>;
    async fn list_tasks_in_sections(&self, section_ids: &[Uuid]) -> anyhow::Result<Vec<Task>>;
    async fn find_task(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>>;
    async fn insert_task(&self, task: &NewTask) -> anyhow::Result<Task>;
    async fn save_task(&self, task: &Task) -> anyhow::Result<Task>;
    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64>;
    async fn task_tags(&self, task_ids: &[Uuid]) -> anyhow::Result<Vec<TaskTag>>;
    /// Replace the whole tag set of a task.
    async fn replace_task_tags(&self, task_id: Uuid, tag_ids: &[Uuid]) -> anyhow::Result<()>;
}
