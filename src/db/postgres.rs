//! PostgreSQL engine over an sqlx pool.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::Store;
use crate::errors::AppError;
use crate::models::label::{Label, LabelChanges, NewLabel};
use crate::models::pagination::Pagination;
use crate::models::task::{NewTask, Task, TaskChanges, TaskFilter};
use crate::models::task_status::{NewTaskStatus, TaskStatus, TaskStatusChanges};
use crate::models::user::{NewUser, User, UserChanges};

const TASK_SELECT: &str = "SELECT t.id, t.task_index, t.name, t.description, t.status_id, \
     s.slug AS status_slug, t.assignee_id, \
     ARRAY(SELECT tl.label_id FROM task_labels tl WHERE tl.task_id = t.id ORDER BY tl.label_id) AS label_ids, \
     t.created_at \
     FROM tasks t JOIN task_statuses s ON s.id = t.status_id";

#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    task_index: Option<i32>,
    name: String,
    description: Option<String>,
    status_id: i64,
    status_slug: String,
    assignee_id: Option<i64>,
    label_ids: Vec<i64>,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            index: row.task_index,
            name: row.name,
            description: row.description,
            status_id: row.status_id,
            status_slug: row.status_slug,
            assignee_id: row.assignee_id,
            label_ids: row.label_ids.into_iter().collect(),
            created_at: row.created_at,
        }
    }
}

/// Translate constraint violations on insert/update.
fn write_error(e: sqlx::Error, entity: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("{entity} already exists"))
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound(format!(
                "Referenced record not found ({})",
                db_err.constraint().unwrap_or("foreign key")
            ))
        }
        other => AppError::Database(other),
    }
}

/// Translate a restrict-on-delete violation.
fn delete_error(e: sqlx::Error, entity: &str, id: i64) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::InUse(format!("{entity} {id} is referenced by a task and cannot be deleted"))
        }
        other => AppError::Database(other),
    }
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn filter_clause(filter: &TaskFilter) -> String {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if filter.title_cont.is_some() {
        param_index += 1;
        conditions.push(format!("t.name ILIKE ${param_index}"));
    }
    if filter.assignee_id.is_some() {
        param_index += 1;
        conditions.push(format!("t.assignee_id = ${param_index}"));
    }
    if filter.status.is_some() {
        param_index += 1;
        conditions.push(format!("s.slug = ${param_index}"));
    }
    if filter.label_id.is_some() {
        param_index += 1;
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM task_labels f WHERE f.task_id = t.id AND f.label_id = ${param_index})"
        ));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

async fn replace_labels(
    tx: &mut Transaction<'_, Postgres>,
    task_id: i64,
    label_ids: &BTreeSet<i64>,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
        .bind(task_id)
        .execute(&mut **tx)
        .await?;
    if label_ids.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = label_ids.iter().copied().collect();
    sqlx::query("INSERT INTO task_labels (task_id, label_id) SELECT $1, UNNEST($2::BIGINT[])")
        .bind(task_id)
        .bind(&ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| write_error(e, "Task label"))?;
    Ok(())
}

async fn fetch_task(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> Result<Option<Task>, AppError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!("{TASK_SELECT} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.map(Task::from))
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, first_name, last_name, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &format!("User with email '{}'", user.email)))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError> {
        // Nullable columns take a (touched, value) pair so an explicit null clears them.
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                first_name = CASE WHEN $3 THEN $4 ELSE first_name END, \
                last_name = CASE WHEN $5 THEN $6 ELSE last_name END, \
                password_hash = COALESCE($7, password_hash), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.email)
        .bind(!changes.first_name.is_absent())
        .bind(changes.first_name.value())
        .bind(!changes.last_name.is_absent())
        .bind(changes.last_name.value())
        .bind(&changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "User with this email"))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| delete_error(e, "User", id))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_status(&self, status: NewTaskStatus) -> Result<TaskStatus, AppError> {
        sqlx::query_as::<_, TaskStatus>(
            "INSERT INTO task_statuses (name, slug) VALUES ($1, $2) RETURNING *",
        )
        .bind(&status.name)
        .bind(&status.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Task status with this name or slug"))
    }

    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, AppError> {
        let statuses = sqlx::query_as::<_, TaskStatus>("SELECT * FROM task_statuses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(statuses)
    }

    async fn find_status(&self, id: i64) -> Result<Option<TaskStatus>, AppError> {
        let status = sqlx::query_as::<_, TaskStatus>("SELECT * FROM task_statuses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status)
    }

    async fn find_status_by_slug(&self, slug: &str) -> Result<Option<TaskStatus>, AppError> {
        let status =
            sqlx::query_as::<_, TaskStatus>("SELECT * FROM task_statuses WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(status)
    }

    async fn update_status(
        &self,
        id: i64,
        changes: TaskStatusChanges,
    ) -> Result<Option<TaskStatus>, AppError> {
        sqlx::query_as::<_, TaskStatus>(
            "UPDATE task_statuses SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "Task status with this name or slug"))
    }

    async fn delete_status(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM task_statuses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| delete_error(e, "Task status", id))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_label(&self, label: NewLabel) -> Result<Label, AppError> {
        sqlx::query_as::<_, Label>("INSERT INTO labels (name) VALUES ($1) RETURNING *")
            .bind(&label.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, &format!("Label with name '{}'", label.name)))
    }

    async fn list_labels(&self) -> Result<Vec<Label>, AppError> {
        let labels = sqlx::query_as::<_, Label>("SELECT * FROM labels ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(labels)
    }

    async fn find_label(&self, id: i64) -> Result<Option<Label>, AppError> {
        let label = sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(label)
    }

    async fn find_label_by_name(&self, name: &str) -> Result<Option<Label>, AppError> {
        let label = sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(label)
    }

    async fn update_label(&self, id: i64, changes: LabelChanges) -> Result<Option<Label>, AppError> {
        sqlx::query_as::<_, Label>(
            "UPDATE labels SET name = COALESCE($2, name) WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "Label with this name"))
    }

    async fn delete_label(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| delete_error(e, "Label", id))?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tasks (task_index, name, description, status_id, assignee_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(task.index)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.status_id)
        .bind(task.assignee_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "Task"))?;

        replace_labels(&mut tx, id, &task.label_ids).await?;
        let created = fetch_task(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Task {id} vanished after insert")))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        let where_clause = filter_clause(filter);
        let count_sql = format!(
            "SELECT COUNT(*) FROM tasks t JOIN task_statuses s ON s.id = t.status_id {where_clause}"
        );
        let data_sql = format!(
            "{TASK_SELECT} {where_clause} ORDER BY t.id ASC LIMIT {} OFFSET {}",
            pagination.limit(),
            pagination.offset()
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut data_query = sqlx::query_as::<_, TaskRow>(&data_sql);

        macro_rules! bind_both {
            ($val:expr) => {
                count_query = count_query.bind($val);
                data_query = data_query.bind($val);
            };
        }

        if let Some(ref title) = filter.title_cont {
            let pattern = contains_pattern(title);
            bind_both!(pattern.clone());
        }
        if let Some(assignee) = filter.assignee_id {
            bind_both!(assignee);
        }
        if let Some(ref slug) = filter.status {
            bind_both!(slug.clone());
        }
        if let Some(label) = filter.label_id {
            bind_both!(label);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let rows = data_query.fetch_all(&self.pool).await?;
        Ok((rows.into_iter().map(Task::from).collect(), total))
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("{TASK_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Task::from))
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE tasks SET \
                task_index = CASE WHEN $2 THEN $3 ELSE task_index END, \
                name = COALESCE($4, name), \
                description = CASE WHEN $5 THEN $6 ELSE description END, \
                status_id = COALESCE($7, status_id), \
                assignee_id = CASE WHEN $8 THEN $9 ELSE assignee_id END \
             WHERE id = $1",
        )
        .bind(id)
        .bind(!changes.index.is_absent())
        .bind(changes.index.value().copied())
        .bind(&changes.name)
        .bind(!changes.description.is_absent())
        .bind(changes.description.value())
        .bind(changes.status_id)
        .bind(!changes.assignee_id.is_absent())
        .bind(changes.assignee_id.value().copied())
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "Task"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if !changes.label_ids.is_absent() {
            let ids = changes.label_ids.value().cloned().unwrap_or_default();
            replace_labels(&mut tx, id, &ids).await?;
        }

        let updated = fetch_task(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_clause_numbers_parameters_in_bind_order() {
        let filter = TaskFilter {
            title_cont: Some("x".to_string()),
            assignee_id: None,
            status: Some("draft".to_string()),
            label_id: Some(4),
        };
        let clause = filter_clause(&filter);
        assert!(clause.starts_with("WHERE t.name ILIKE $1 AND s.slug = $2"));
        assert!(clause.contains("f.label_id = $3"));
    }

    #[test]
    fn empty_filter_has_no_where() {
        assert!(filter_clause(&TaskFilter::default()).is_empty());
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
