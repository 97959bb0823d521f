//! Task status model: a named, slugged workflow column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::patch::Patch;
use crate::validation::rules;

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct TaskStatus {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTaskStatus {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStatusChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTaskStatus {
    #[validate(
        required(message = "Name cannot be empty."),
        custom(function = "rules::not_blank")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Slug cannot be empty."),
        custom(function = "rules::slug")
    )]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTaskStatus {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "rules::patch_status_name"))]
    pub name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "rules::patch_slug"))]
    pub slug: Patch<String>,
}
