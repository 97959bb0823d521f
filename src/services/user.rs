//! User service: CRUD with self-or-admin ownership checks.

use crate::db::Store;
use crate::errors::AppError;
use crate::mapper;
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::services::auth::hash_password;
use crate::services::verifier::Principal;

pub async fn list(store: &dyn Store) -> Result<Vec<User>, AppError> {
    store.list_users().await
}

/// Find a user by ID.
pub async fn find_by_id(store: &dyn Store, id: i64) -> Result<User, AppError> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {id} not found")))
}

/// Resolve the local account behind a principal.
///
/// Remote principals map to a local user by email subject.
pub async fn current(store: &dyn Store, principal: &Principal) -> Result<User, AppError> {
    let user = match principal.user_id {
        Some(id) => store.find_user(id).await?,
        None => store.find_user_by_email(&principal.subject).await?,
    };
    user.ok_or_else(|| AppError::NotFound("No local account for the authenticated subject".to_string()))
}

/// Allow the change when the caller is the target user or holds admin scope.
async fn authorize_owner(store: &dyn Store, principal: &Principal, id: i64) -> Result<(), AppError> {
    if principal.is_admin() {
        return Ok(());
    }
    let owns = match principal.user_id {
        Some(user_id) => user_id == id,
        None => store
            .find_user_by_email(&principal.subject)
            .await?
            .is_some_and(|u| u.id == id),
    };
    if owns {
        Ok(())
    } else {
        tracing::warn!(subject = %principal.subject, target = id, "Refused change to another user");
        Err(AppError::Forbidden(
            "You can only modify your own account".to_string(),
        ))
    }
}

pub async fn create(store: &dyn Store, input: CreateUser) -> Result<User, AppError> {
    let new_user = mapper::user::to_new_user(input, hash_password)?;
    let user = store.insert_user(new_user).await?;
    tracing::info!(user_id = user.id, "User created");
    Ok(user)
}

pub async fn update(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
    input: UpdateUser,
) -> Result<User, AppError> {
    authorize_owner(store, principal, id).await?;
    let changes = mapper::user::to_changes(input, hash_password)?;
    if changes.is_empty() {
        return find_by_id(store, id).await;
    }
    store
        .update_user(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {id} not found")))
}

pub async fn delete(store: &dyn Store, principal: &Principal, id: i64) -> Result<(), AppError> {
    authorize_owner(store, principal, id).await?;
    if !store.delete_user(id).await? {
        return Err(AppError::NotFound(format!("User with id {id} not found")));
    }
    tracing::info!(user_id = id, "User deleted");
    Ok(())
}
