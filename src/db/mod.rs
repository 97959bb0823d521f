//! Storage engines behind a single `Store` trait.
//!
//! Two interchangeable engines: an embedded in-memory store (development and
//! tests) and PostgreSQL through an sqlx pool. The engine is chosen once at
//! startup from [`DatabaseConfig`].

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::errors::AppError;
use crate::models::label::{Label, LabelChanges, NewLabel};
use crate::models::pagination::Pagination;
use crate::models::task::{NewTask, Task, TaskChanges, TaskFilter};
use crate::models::task_status::{NewTaskStatus, TaskStatus, TaskStatusChanges};
use crate::models::user::{NewUser, User, UserChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence operations used by the services.
///
/// Lookups return `Ok(None)` for missing rows; updates return `Ok(None)` when
/// the row does not exist; deletes report whether a row was removed. Unique
/// key clashes surface as [`AppError::Conflict`], deleting a referenced row as
/// [`AppError::InUse`].
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    async fn ping(&self) -> Result<(), AppError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError>;
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;

    async fn insert_status(&self, status: NewTaskStatus) -> Result<TaskStatus, AppError>;
    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, AppError>;
    async fn find_status(&self, id: i64) -> Result<Option<TaskStatus>, AppError>;
    async fn find_status_by_slug(&self, slug: &str) -> Result<Option<TaskStatus>, AppError>;
    async fn update_status(
        &self,
        id: i64,
        changes: TaskStatusChanges,
    ) -> Result<Option<TaskStatus>, AppError>;
    async fn delete_status(&self, id: i64) -> Result<bool, AppError>;

    async fn insert_label(&self, label: NewLabel) -> Result<Label, AppError>;
    async fn list_labels(&self) -> Result<Vec<Label>, AppError>;
    async fn find_label(&self, id: i64) -> Result<Option<Label>, AppError>;
    async fn find_label_by_name(&self, name: &str) -> Result<Option<Label>, AppError>;
    async fn update_label(&self, id: i64, changes: LabelChanges) -> Result<Option<Label>, AppError>;
    async fn delete_label(&self, id: i64) -> Result<bool, AppError>;

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError>;
    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<Task>, i64), AppError>;
    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError>;
    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>, AppError>;
    async fn delete_task(&self, id: i64) -> Result<bool, AppError>;
}

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Open the configured engine, running migrations for PostgreSQL.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, AppError> {
    match config {
        DatabaseConfig::Embedded => {
            tracing::info!("Using embedded in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        DatabaseConfig::Postgres {
            url,
            max_connections,
        } => {
            let pool = create_pool(url, *max_connections).await?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| AppError::Internal(format!("Migration failed: {e}")))?;
            tracing::info!(max_connections = *max_connections, "Connected to PostgreSQL");
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
