use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::patch::Patch;
use crate::validation::rules;

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLabel {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelChanges {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLabel {
    #[validate(
        required(message = "The label name cannot be empty."),
        custom(function = "rules::label_name")
    )]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateLabel {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    #[validate(custom(function = "rules::patch_label_name"))]
    pub name: Patch<String>,
}
