//! Task model, filters, change set, and wire DTOs.
//!
//! The wire shape keeps the names the web client expects (`title`, `content`,
//! `assignee_id`, `taskLabelIds`, status by slug); storage uses `name`,
//! `description`, status id and a label id set. See `crate::mapper::task`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::patch::Patch;
use crate::validation::rules;

/// Stored task joined with its status slug.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub index: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub status_id: i64,
    pub status_slug: String,
    pub assignee_id: Option<i64>,
    pub label_ids: BTreeSet<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub index: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub status_id: i64,
    pub assignee_id: Option<i64>,
    pub label_ids: BTreeSet<i64>,
}

/// Column changes for a task update.
///
/// Required columns (`name`, `status_id`) use `Option`; nullable columns and
/// the label set keep the full `Patch` so an explicit null clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub index: Patch<i32>,
    pub name: Option<String>,
    pub description: Patch<String>,
    pub status_id: Option<i64>,
    pub assignee_id: Patch<i64>,
    pub label_ids: Patch<BTreeSet<i64>>,
}

/// Query filters for listing tasks. All present filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub title_cont: Option<String>,
    pub assignee_id: Option<i64>,
    pub status: Option<String>,
    pub label_id: Option<i64>,
}

impl TaskFilter {
    /// Evaluate the filter against a task in memory.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(ref needle) = self.title_cont {
            if !task.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(assignee) = self.assignee_id {
            if task.assignee_id != Some(assignee) {
                return false;
            }
        }
        if let Some(ref slug) = self.status {
            if &task.status_slug != slug {
                return false;
            }
        }
        if let Some(label) = self.label_id {
            if !task.label_ids.contains(&label) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub index: Option<i32>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub assignee_id: Option<i64>,
    pub title: String,
    pub content: Option<String>,
    pub status: String,
    #[serde(rename = "taskLabelIds")]
    pub task_label_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTask {
    pub index: Option<i32>,
    pub assignee_id: Option<i64>,
    #[validate(
        required(message = "Title cannot be null."),
        length(min = 1, message = "Title must contain at least 1 character.")
    )]
    pub title: Option<String>,
    pub content: Option<String>,
    #[validate(
        required(message = "Status cannot be empty."),
        custom(function = "rules::not_blank")
    )]
    pub status: Option<String>,
    #[serde(default, rename = "taskLabelIds")]
    pub task_label_ids: BTreeSet<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTask {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub index: Patch<i32>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub assignee_id: Patch<i64>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "rules::patch_title"))]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub content: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "rules::patch_task_status"))]
    pub status: Patch<String>,
    #[serde(rename = "taskLabelIds", skip_serializing_if = "Patch::is_absent")]
    pub task_label_ids: Patch<BTreeSet<i64>>,
}
