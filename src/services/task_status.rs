//! Task status service.

use crate::db::Store;
use crate::errors::AppError;
use crate::mapper;
use crate::models::task_status::{CreateTaskStatus, TaskStatus, UpdateTaskStatus};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Task status with id {id} not found"))
}

pub async fn list(store: &dyn Store) -> Result<Vec<TaskStatus>, AppError> {
    store.list_statuses().await
}

pub async fn find_by_id(store: &dyn Store, id: i64) -> Result<TaskStatus, AppError> {
    store.find_status(id).await?.ok_or_else(|| not_found(id))
}

/// Resolve a status slug as sent by clients on task payloads.
pub async fn find_by_slug(store: &dyn Store, slug: &str) -> Result<TaskStatus, AppError> {
    store
        .find_status_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task status '{slug}' not found")))
}

pub async fn create(store: &dyn Store, input: CreateTaskStatus) -> Result<TaskStatus, AppError> {
    let status = store.insert_status(mapper::task_status::to_new_status(input)?).await?;
    tracing::info!(status_id = status.id, slug = %status.slug, "Task status created");
    Ok(status)
}

pub async fn update(
    store: &dyn Store,
    id: i64,
    input: UpdateTaskStatus,
) -> Result<TaskStatus, AppError> {
    let changes = mapper::task_status::to_changes(input)?;
    store.update_status(id, changes).await?.ok_or_else(|| not_found(id))
}

pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
    if !store.delete_status(id).await? {
        return Err(not_found(id));
    }
    tracing::info!(status_id = id, "Task status deleted");
    Ok(())
}
