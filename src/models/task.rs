use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{nullable, project::Project, section::Section, tag::Tag};
use crate::error::AppError;

/// Canonical priority vocabulary. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(anyhow::anyhow!("Unknown priority: {s}")),
        }
    }
}

/// DB row. Priority is stored as TEXT and only ever written from a `Priority`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    /// `None` means the task lives in the Inbox.
    pub project_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task joined with its tags, project and section.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub tags: Vec<Tag>,
    pub project: Option<Project>,
    pub section: Option<Section>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub section_id: Option<Uuid>,
}

/// Partial update. Nullable columns are tri-state: absent, `null`, or a value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub is_completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub priority: Option<Option<Priority>>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub section_id: Option<Option<Uuid>>,
    /// Full replacement of the tag set when present; `[]` clears it.
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Which projects a task listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectFilter {
    /// No project constraint: every project plus the Inbox.
    #[default]
    Unfiltered,
    /// Only tasks without a project.
    InboxOnly,
    Project(Uuid),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub project: ProjectFilter,
    /// Matched against the calendar date of `due_date`.
    pub due_date: Option<NaiveDate>,
}

/// Raw `GET /api/tasks` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub project_id: Option<String>,
    pub due_date: Option<String>,
}

impl TryFrom<TaskListQuery> for TaskFilter {
    type Error = AppError;

    fn try_from(query: TaskListQuery) -> Result<Self, Self::Error> {
        let project = match query.project_id.as_deref().map(str::trim) {
            None | Some("") => ProjectFilter::Unfiltered,
            Some("null") => ProjectFilter::InboxOnly,
            Some(raw) => ProjectFilter::Project(
                raw.parse()
                    .map_err(|_| AppError::Validation(format!("Invalid projectId: {raw}")))?,
            ),
        };

        let due_date = match query.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_calendar_date(raw)?),
        };

        Ok(TaskFilter { project, due_date })
    }
}

/// Normalize a due date to its calendar day.
///
/// Accepts `YYYY-MM-DD` or an ISO datetime; a datetime keeps the date part as
/// written, so `2024-03-01T23:00:00Z` is `2024-03-01`.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    Err(AppError::Validation(format!("Invalid date: {raw}")))
}
