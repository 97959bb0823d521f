//! Label service.

use std::collections::BTreeSet;

use crate::db::Store;
use crate::errors::AppError;
use crate::mapper;
use crate::models::label::{CreateLabel, Label, UpdateLabel};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Label with id {id} not found"))
}

pub async fn list(store: &dyn Store) -> Result<Vec<Label>, AppError> {
    store.list_labels().await
}

pub async fn find_by_id(store: &dyn Store, id: i64) -> Result<Label, AppError> {
    store.find_label(id).await?.ok_or_else(|| not_found(id))
}

/// Fail with 404 on the first id that does not name a label.
pub async fn ensure_exist(store: &dyn Store, ids: &BTreeSet<i64>) -> Result<(), AppError> {
    for &id in ids {
        find_by_id(store, id).await?;
    }
    Ok(())
}

pub async fn create(store: &dyn Store, input: CreateLabel) -> Result<Label, AppError> {
    let label = store.insert_label(mapper::label::to_new_label(input)?).await?;
    tracing::info!(label_id = label.id, "Label created");
    Ok(label)
}

pub async fn update(store: &dyn Store, id: i64, input: UpdateLabel) -> Result<Label, AppError> {
    let changes = mapper::label::to_changes(input)?;
    store.update_label(id, changes).await?.ok_or_else(|| not_found(id))
}

pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
    if !store.delete_label(id).await? {
        return Err(not_found(id));
    }
    tracing::info!(label_id = id, "Label deleted");
    Ok(())
}
