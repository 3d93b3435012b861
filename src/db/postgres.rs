use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
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

const USER_COLUMNS: &str = "id, email, name, avatar, language, created_at, updated_at";

/// `Store` backed by the Postgres schema in `./migrations`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<UserCredentials>> {
        let creds = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(creds)
    }

    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        language: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, language)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(language)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, patch: &UpdateProfileRequest) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "UPDATE users
             SET name = COALESCE($1, name),
                 avatar = COALESCE($2, avatar),
                 language = COALESCE($3, language),
                 updated_at = NOW()
             WHERE id = $4",
        )
        .bind(&patch.name)
        .bind(&patch.avatar)
        .bind(&patch.language)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_categories(&self, user_id: Uuid) -> anyhow::Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn find_default_category(&self, user_id: Uuid) -> anyhow::Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE user_id = $1 AND is_default = TRUE",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn insert_category(&self, category: &NewCategory) -> anyhow::Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (user_id, name, color, is_default)
             VALUES ($1, $2, $3, FALSE)
             RETURNING *",
        )
        .bind(category.user_id)
        .bind(&category.name)
        .bind(&category.color)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn insert_default_category(
        &self,
        category: &NewCategory,
    ) -> anyhow::Result<Option<Category>> {
        // The partial unique index on (user_id) WHERE is_default makes
        // concurrent bootstraps converge on a single row.
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (user_id, name, color, is_default)
             VALUES ($1, $2, $3, TRUE)
             ON CONFLICT (user_id) WHERE is_default DO NOTHING
             RETURNING *",
        )
        .bind(category.user_id)
        .bind(&category.name)
        .bind(&category.color)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn save_category(&self, category: &Category) -> anyhow::Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories
             SET name = $1, color = $2, is_default = $3, updated_at = NOW()
             WHERE id = $4 AND user_id = $5
             RETURNING *",
        )
        .bind(&category.name)
        .bind(&category.color)
        .bind(category.is_default)
        .bind(category.id)
        .bind(category.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_projects(
        &self,
        user_id: Uuid,
        is_favorite: Option<bool>,
    ) -> anyhow::Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects
             WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR is_favorite = $2)
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(is_favorite)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn find_project(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn find_projects_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn insert_project(&self, project: &NewProject) -> anyhow::Result<Project> {
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (user_id, name, color)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(project.user_id)
        .bind(&project.name)
        .bind(&project.color)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    async fn save_project(&self, project: &Project) -> anyhow::Result<Project> {
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects
             SET name = $1, color = $2, is_favorite = $3, updated_at = NOW()
             WHERE id = $4 AND user_id = $5
             RETURNING *",
        )
        .bind(&project.name)
        .bind(&project.color)
        .bind(project.is_favorite)
        .bind(project.id)
        .bind(project.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_sections(&self, project_ids: &[Uuid]) -> anyhow::Result<Vec<Section>> {
        let sections = sqlx::query_as::<_, Section>(
            "SELECT * FROM sections
             WHERE project_id = ANY($1)
             ORDER BY sort_order ASC, created_at ASC",
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(sections)
    }

    async fn find_section(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Section>> {
        let section = sqlx::query_as::<_, Section>(
            "SELECT s.* FROM sections s
             JOIN projects p ON p.id = s.project_id
             WHERE s.id = $1 AND p.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(section)
    }

    async fn find_sections_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Section>> {
        let sections = sqlx::query_as::<_, Section>("SELECT * FROM sections WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(sections)
    }

    async fn max_section_order(&self, project_id: Uuid) -> anyhow::Result<Option<i32>> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(sort_order) FROM sections WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(max)
    }

    async fn insert_section(&self, section: &NewSection) -> anyhow::Result<Section> {
        let section = sqlx::query_as::<_, Section>(
            "INSERT INTO sections (project_id, name, sort_order)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(section.project_id)
        .bind(&section.name)
        .bind(section.order)
        .fetch_one(&self.pool)
        .await?;
        Ok(section)
    }

    async fn save_section(&self, section: &Section) -> anyhow::Result<Section> {
        let section = sqlx::query_as::<_, Section>(
            "UPDATE sections
             SET name = $1, sort_order = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING *",
        )
        .bind(&section.name)
        .bind(section.order)
        .bind(section.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(section)
    }

    async fn set_section_orders(
        &self,
        project_id: Uuid,
        orders: &[(Uuid, i32)],
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for &(id, order) in orders {
            sqlx::query(
                "UPDATE sections SET sort_order = $1, updated_at = NOW()
                 WHERE id = $2 AND project_id = $3",
            )
            .bind(order)
            .bind(id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_section(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query(
            "DELETE FROM sections s
             USING projects p
             WHERE s.id = $1 AND p.id = s.project_id AND p.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_tags(&self, user_id: Uuid) -> anyhow::Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT * FROM tags WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn find_tag(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_tags_by_ids(
        &self,
        ids: &[Uuid],
        user_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT * FROM tags
             WHERE id = ANY($1) AND ($2::UUID IS NULL OR user_id = $2)",
        )
        .bind(ids)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn insert_tag(&self, tag: &NewTag) -> anyhow::Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (user_id, name, color)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(tag.user_id)
        .bind(&tag.name)
        .bind(&tag.color)
        .fetch_one(&self.pool)
        .await?;
        Ok(tag)
    }

    async fn save_tag(&self, tag: &Tag) -> anyhow::Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            "UPDATE tags
             SET name = $1, color = $2, updated_at = NOW()
             WHERE id = $3 AND user_id = $4
             RETURNING *",
        )
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(tag.id)
        .bind(tag.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(tag)
    }

    async fn delete_tag(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> anyhow::Result<Vec<Task>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM tasks WHERE user_id = ");
        query.push_bind(user_id);

        match filter.project {
            ProjectFilter::Unfiltered => {}
            ProjectFilter::InboxOnly => {
                query.push(" AND project_id IS NULL");
            }
            ProjectFilter::Project(project_id) => {
                query.push(" AND project_id = ").push_bind(project_id);
            }
        }

        // due_date is a DATE column, so equality ignores time of day.
        if let Some(due_date) = filter.due_date {
            query.push(" AND due_date = ").push_bind(due_date);
        }

        query.push(" ORDER BY created_at DESC");

        let tasks = query.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn list_tasks_in_projects(&self, project_ids: &[Uuid]) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE project_id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn list_tasks_in_sections(&self, section_ids: &[Uuid]) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE section_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(section_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert_task(&self, task: &NewTask) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks
                (user_id, project_id, section_id, title, description, due_date, priority)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(task.user_id)
        .bind(task.project_id)
        .bind(task.section_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.priority.map(|p| p.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET project_id = $1,
                 section_id = $2,
                 title = $3,
                 description = $4,
                 is_completed = $5,
                 due_date = $6,
                 priority = $7,
                 updated_at = NOW()
             WHERE id = $8 AND user_id = $9
             RETURNING *",
        )
        .bind(task.project_id)
        .bind(task.section_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .bind(task.due_date)
        .bind(&task.priority)
        .bind(task.id)
        .bind(task.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn task_tags(&self, task_ids: &[Uuid]) -> anyhow::Result<Vec<TaskTag>> {
        let rows = sqlx::query_as::<_, TaskTag>(
            "SELECT tt.task_id, t.*
             FROM task_tags tt
             JOIN tags t ON t.id = tt.tag_id
             WHERE tt.task_id = ANY($1)
             ORDER BY t.created_at DESC",
        )
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn replace_task_tags(&self, task_id: Uuid, tag_ids: &[Uuid]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM task_tags WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        if !tag_ids.is_empty() {
            sqlx::query(
                "INSERT INTO task_tags (task_id, tag_id)
                 SELECT $1, UNNEST($2::UUID[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(task_id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
