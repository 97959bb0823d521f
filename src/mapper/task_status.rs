use crate::errors::AppError;
use crate::models::task_status::{
    CreateTaskStatus, NewTaskStatus, TaskStatus, TaskStatusChanges, TaskStatusResponse,
    UpdateTaskStatus,
};

impl From<TaskStatus> for TaskStatusResponse {
    fn from(s: TaskStatus) -> Self {
        Self {
            id: s.id,
            name: s.name,
            slug: s.slug,
            created_at: s.created_at,
        }
    }
}

pub fn to_new_status(input: CreateTaskStatus) -> Result<NewTaskStatus, AppError> {
    Ok(NewTaskStatus {
        name: input
            .name
            .ok_or_else(|| AppError::invalid_field("name", "required", "Name cannot be empty."))?,
        slug: input
            .slug
            .ok_or_else(|| AppError::invalid_field("slug", "required", "Slug cannot be empty."))?,
    })
}

pub fn to_changes(input: UpdateTaskStatus) -> Result<TaskStatusChanges, AppError> {
    Ok(TaskStatusChanges {
        name: input.name.into_required().ok_or_else(|| {
            AppError::invalid_field("name", "must_not_be_null", "Name cannot be null.")
        })?,
        slug: input.slug.into_required().ok_or_else(|| {
            AppError::invalid_field("slug", "must_not_be_null", "Slug cannot be null.")
        })?,
    })
}

pub fn apply_changes(status: &mut TaskStatus, changes: TaskStatusChanges) {
    if let Some(name) = changes.name {
        status.name = name;
    }
    if let Some(slug) = changes.slug {
        status.slug = slug;
    }
}
