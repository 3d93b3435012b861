use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::task::TaskDetail;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    /// Stored as `sort_order`: `order` is a reserved word in SQL.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A section joined with its tasks, oldest task first.
#[derive(Debug, Clone, Serialize)]
pub struct SectionWithTasks {
    #[serde(flatten)]
    pub section: Section,
    pub tasks: Vec<TaskDetail>,
}

#[derive(Debug, Clone)]
pub struct NewSection {
    pub project_id: Uuid,
    pub name: String,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionRequest {
    pub project_id: Uuid,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSectionRequest {
    pub name: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SectionOrder {
    pub id: Uuid,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSectionsRequest {
    pub project_id: Uuid,
    #[serde(default)]
    pub section_orders: Vec<SectionOrder>,
}
