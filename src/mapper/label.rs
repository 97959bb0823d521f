use crate::errors::AppError;
use crate::models::label::{CreateLabel, Label, LabelChanges, LabelResponse, NewLabel, UpdateLabel};

impl From<Label> for LabelResponse {
    fn from(l: Label) -> Self {
        Self {
            id: l.id,
            name: l.name,
            created_at: l.created_at,
        }
    }
}

pub fn to_new_label(input: CreateLabel) -> Result<NewLabel, AppError> {
    let name = input.name.ok_or_else(|| {
        AppError::invalid_field("name", "required", "The label name cannot be empty.")
    })?;
    Ok(NewLabel { name })
}

pub fn to_changes(input: UpdateLabel) -> Result<LabelChanges, AppError> {
    let name = input.name.into_required().ok_or_else(|| {
        AppError::invalid_field("name", "must_not_be_null", "The label name cannot be null.")
    })?;
    Ok(LabelChanges { name })
}

pub fn apply_changes(label: &mut Label, changes: LabelChanges) {
    if let Some(name) = changes.name {
        label.name = name;
    }
}
