use crate::errors::AppError;
use crate::models::patch::Patch;
use crate::models::task::{CreateTask, NewTask, Task, TaskChanges, TaskResponse, UpdateTask};

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            index: t.index,
            created_at: t.created_at,
            assignee_id: t.assignee_id,
            title: t.name,
            content: t.description,
            status: t.status_slug,
            task_label_ids: t.label_ids.into_iter().collect(),
        }
    }
}

/// Map a validated create DTO once its status slug has been resolved to an id.
pub fn to_new_task(input: CreateTask, status_id: i64) -> Result<NewTask, AppError> {
    let name = input
        .title
        .ok_or_else(|| AppError::invalid_field("title", "required", "Title cannot be null."))?;

    Ok(NewTask {
        index: input.index,
        name,
        description: input.content,
        status_id,
        assignee_id: input.assignee_id,
        label_ids: input.task_label_ids,
    })
}

/// Map a validated update DTO. `status_id` is the resolved id of a present
/// `status` value; the slug itself is not carried into the change set.
pub fn to_changes(input: UpdateTask, status_id: Option<i64>) -> Result<TaskChanges, AppError> {
    if input.status.is_null() {
        return Err(AppError::invalid_field(
            "status",
            "must_not_be_null",
            "Status cannot be null.",
        ));
    }
    let name = input.title.into_required().ok_or_else(|| {
        AppError::invalid_field("title", "must_not_be_null", "Title cannot be null.")
    })?;

    Ok(TaskChanges {
        index: input.index,
        name,
        description: input.content,
        status_id,
        assignee_id: input.assignee_id,
        label_ids: input.task_label_ids,
    })
}

/// Apply a change set to a stored task. The caller refreshes `status_slug`
/// when `status_id` changes.
pub fn apply_changes(task: &mut Task, changes: TaskChanges) {
    changes.index.apply_to(&mut task.index);
    if let Some(name) = changes.name {
        task.name = name;
    }
    changes.description.apply_to(&mut task.description);
    if let Some(status_id) = changes.status_id {
        task.status_id = status_id;
    }
    changes.assignee_id.apply_to(&mut task.assignee_id);
    match changes.label_ids {
        Patch::Absent => {}
        Patch::Null => task.label_ids.clear(),
        Patch::Value(ids) => task.label_ids = ids,
    }
}
