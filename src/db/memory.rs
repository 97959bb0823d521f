//! Embedded in-memory engine.
//!
//! Enforces the same constraints as the PostgreSQL schema: unique keys,
//! required references on insert/update, and restrict-on-delete.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Store;
use crate::errors::AppError;
use crate::mapper;
use crate::models::label::{Label, LabelChanges, NewLabel};
use crate::models::pagination::Pagination;
use crate::models::task::{NewTask, Task, TaskChanges, TaskFilter};
use crate::models::task_status::{NewTaskStatus, TaskStatus, TaskStatusChanges};
use crate::models::user::{NewUser, User, UserChanges};

#[derive(Debug, Default)]
struct Tables {
    sequences: Sequences,
    users: BTreeMap<i64, User>,
    statuses: BTreeMap<i64, TaskStatus>,
    labels: BTreeMap<i64, Label>,
    tasks: BTreeMap<i64, Task>,
}

/// One id sequence per table, like `BIGSERIAL` columns.
#[derive(Debug, Default)]
struct Sequences {
    users: i64,
    statuses: i64,
    labels: i64,
    tasks: i64,
}

fn next_val(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl Tables {

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
    }

    fn check_status_unique(&self, name: Option<&str>, slug: Option<&str>, except: Option<i64>) -> Result<(), AppError> {
        for s in self.statuses.values().filter(|s| Some(s.id) != except) {
            if name == Some(s.name.as_str()) {
                return Err(AppError::Conflict(format!(
                    "Task status with name '{}' already exists",
                    s.name
                )));
            }
            if slug == Some(s.slug.as_str()) {
                return Err(AppError::Conflict(format!(
                    "Task status with slug '{}' already exists",
                    s.slug
                )));
            }
        }
        Ok(())
    }

    fn label_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.labels
            .values()
            .any(|l| l.name == name && Some(l.id) != except)
    }

    /// Reject dangling references the way foreign keys would.
    fn check_task_refs(
        &self,
        status_id: i64,
        assignee_id: Option<i64>,
        label_ids: &BTreeSet<i64>,
    ) -> Result<(), AppError> {
        if !self.statuses.contains_key(&status_id) {
            return Err(AppError::NotFound(format!("Task status {status_id} not found")));
        }
        if let Some(id) = assignee_id {
            if !self.users.contains_key(&id) {
                return Err(AppError::NotFound(format!("User {id} not found")));
            }
        }
        if let Some(id) = label_ids.iter().find(|id| !self.labels.contains_key(id)) {
            return Err(AppError::NotFound(format!("Label {id} not found")));
        }
        Ok(())
    }

    /// Copy a task out with its current status slug.
    fn hydrate(&self, task: &Task) -> Task {
        let mut task = task.clone();
        if let Some(status) = self.statuses.get(&task.status_id) {
            task.status_slug = status.slug.clone();
        }
        task
    }
}

/// In-memory store guarded by a single async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        let _ = self.tables.read().await;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut t = self.tables.write().await;
        if t.email_taken(&user.email, None) {
            return Err(AppError::Conflict(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }
        let now = Utc::now();
        let row = User {
            id: next_val(&mut t.sequences.users),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(ref email) = changes.email {
            if t.email_taken(email, Some(id)) {
                return Err(AppError::Conflict(format!(
                    "User with email '{email}' already exists"
                )));
            }
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        mapper::user::apply_changes(user, changes);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&id) {
            return Ok(false);
        }
        if t.tasks.values().any(|task| task.assignee_id == Some(id)) {
            return Err(AppError::InUse(format!(
                "User {id} is assigned to a task and cannot be deleted"
            )));
        }
        Ok(t.users.remove(&id).is_some())
    }

    async fn insert_status(&self, status: NewTaskStatus) -> Result<TaskStatus, AppError> {
        let mut t = self.tables.write().await;
        t.check_status_unique(Some(&status.name), Some(&status.slug), None)?;
        let row = TaskStatus {
            id: next_val(&mut t.sequences.statuses),
            name: status.name,
            slug: status.slug,
            created_at: Utc::now(),
        };
        t.statuses.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, AppError> {
        Ok(self.tables.read().await.statuses.values().cloned().collect())
    }

    async fn find_status(&self, id: i64) -> Result<Option<TaskStatus>, AppError> {
        Ok(self.tables.read().await.statuses.get(&id).cloned())
    }

    async fn find_status_by_slug(&self, slug: &str) -> Result<Option<TaskStatus>, AppError> {
        let t = self.tables.read().await;
        Ok(t.statuses.values().find(|s| s.slug == slug).cloned())
    }

    async fn update_status(
        &self,
        id: i64,
        changes: TaskStatusChanges,
    ) -> Result<Option<TaskStatus>, AppError> {
        let mut t = self.tables.write().await;
        if !t.statuses.contains_key(&id) {
            return Ok(None);
        }
        t.check_status_unique(changes.name.as_deref(), changes.slug.as_deref(), Some(id))?;
        let Some(status) = t.statuses.get_mut(&id) else {
            return Ok(None);
        };
        mapper::task_status::apply_changes(status, changes);
        Ok(Some(status.clone()))
    }

    async fn delete_status(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;
        if !t.statuses.contains_key(&id) {
            return Ok(false);
        }
        if t.tasks.values().any(|task| task.status_id == id) {
            return Err(AppError::InUse(format!(
                "Task status {id} is used by a task and cannot be deleted"
            )));
        }
        Ok(t.statuses.remove(&id).is_some())
    }

    async fn insert_label(&self, label: NewLabel) -> Result<Label, AppError> {
        let mut t = self.tables.write().await;
        if t.label_taken(&label.name, None) {
            return Err(AppError::Conflict(format!(
                "Label with name '{}' already exists",
                label.name
            )));
        }
        let row = Label {
            id: next_val(&mut t.sequences.labels),
            name: label.name,
            created_at: Utc::now(),
        };
        t.labels.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_labels(&self) -> Result<Vec<Label>, AppError> {
        Ok(self.tables.read().await.labels.values().cloned().collect())
    }

    async fn find_label(&self, id: i64) -> Result<Option<Label>, AppError> {
        Ok(self.tables.read().await.labels.get(&id).cloned())
    }

    async fn find_label_by_name(&self, name: &str) -> Result<Option<Label>, AppError> {
        let t = self.tables.read().await;
        Ok(t.labels.values().find(|l| l.name == name).cloned())
    }

    async fn update_label(&self, id: i64, changes: LabelChanges) -> Result<Option<Label>, AppError> {
        let mut t = self.tables.write().await;
        if !t.labels.contains_key(&id) {
            return Ok(None);
        }
        if let Some(ref name) = changes.name {
            if t.label_taken(name, Some(id)) {
                return Err(AppError::Conflict(format!(
                    "Label with name '{name}' already exists"
                )));
            }
        }
        let Some(label) = t.labels.get_mut(&id) else {
            return Ok(None);
        };
        mapper::label::apply_changes(label, changes);
        Ok(Some(label.clone()))
    }

    async fn delete_label(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.write().await;
        if !t.labels.contains_key(&id) {
            return Ok(false);
        }
        if t.tasks.values().any(|task| task.label_ids.contains(&id)) {
            return Err(AppError::InUse(format!(
                "Label {id} is attached to a task and cannot be deleted"
            )));
        }
        Ok(t.labels.remove(&id).is_some())
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut t = self.tables.write().await;
        t.check_task_refs(task.status_id, task.assignee_id, &task.label_ids)?;
        let row = Task {
            id: next_val(&mut t.sequences.tasks),
            index: task.index,
            name: task.name,
            description: task.description,
            status_id: task.status_id,
            status_slug: String::new(),
            assignee_id: task.assignee_id,
            label_ids: task.label_ids,
            created_at: Utc::now(),
        };
        t.tasks.insert(row.id, row.clone());
        Ok(t.hydrate(&row))
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<Task>, i64), AppError> {
        let t = self.tables.read().await;
        let matching: Vec<Task> = t
            .tasks
            .values()
            .map(|task| t.hydrate(task))
            .filter(|task| filter.matches(task))
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit()).unwrap_or(1))
            .collect();
        Ok((items, total))
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let t = self.tables.read().await;
        Ok(t.tasks.get(&id).map(|task| t.hydrate(task)))
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        let mut t = self.tables.write().await;
        let Some(current) = t.tasks.get(&id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        mapper::task::apply_changes(&mut updated, changes);
        t.check_task_refs(updated.status_id, updated.assignee_id, &updated.label_ids)?;
        let updated = t.hydrate(&updated);
        t.tasks.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_task(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}
