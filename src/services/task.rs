//! Task service: reference resolution, CRUD and filtered listing.

use crate::db::Store;
use crate::errors::AppError;
use crate::mapper;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::patch::Patch;
use crate::models::task::{CreateTask, Task, TaskFilter, TaskResponse, UpdateTask};
use crate::services::{label as label_service, task_status as status_service, user as user_service};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Task with id {id} not found"))
}

/// List tasks matching every present filter, one page at a time.
pub async fn list(
    store: &dyn Store,
    filter: &TaskFilter,
    pagination: &Pagination,
) -> Result<PagedResult<TaskResponse>, AppError> {
    let (tasks, total) = store.list_tasks(filter, pagination).await?;
    let items = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(PagedResult::new(items, total, pagination))
}

pub async fn find_by_id(store: &dyn Store, id: i64) -> Result<Task, AppError> {
    store.find_task(id).await?.ok_or_else(|| not_found(id))
}

pub async fn create(store: &dyn Store, input: CreateTask) -> Result<Task, AppError> {
    let slug = input.status.as_deref().unwrap_or_default();
    let status = status_service::find_by_slug(store, slug).await?;
    if let Some(assignee) = input.assignee_id {
        user_service::find_by_id(store, assignee).await?;
    }
    label_service::ensure_exist(store, &input.task_label_ids).await?;

    let task = store
        .insert_task(mapper::task::to_new_task(input, status.id)?)
        .await?;
    tracing::info!(task_id = task.id, status = %task.status_slug, "Task created");
    Ok(task)
}

pub async fn update(store: &dyn Store, id: i64, input: UpdateTask) -> Result<Task, AppError> {
    find_by_id(store, id).await?;

    let status_id = match input.status.value() {
        Some(slug) => Some(status_service::find_by_slug(store, slug).await?.id),
        None => None,
    };
    if let Patch::Value(assignee) = input.assignee_id {
        user_service::find_by_id(store, assignee).await?;
    }
    if let Patch::Value(ref ids) = input.task_label_ids {
        label_service::ensure_exist(store, ids).await?;
    }

    let changes = mapper::task::to_changes(input, status_id)?;
    store.update_task(id, changes).await?.ok_or_else(|| not_found(id))
}

pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
    if !store.delete_task(id).await? {
        return Err(not_found(id));
    }
    tracing::info!(task_id = id, "Task deleted");
    Ok(())
}
