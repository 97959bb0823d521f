//! Field rules shared by the request DTOs.
//!
//! Rules on `Patch<T>` fields reject an explicit `null` for columns that
//! cannot be cleared and apply the create-time rules to a present value.
//! An omitted field always passes.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidateEmail, ValidationError};

use crate::models::patch::Patch;

pub const LABEL_NAME_MIN: usize = 3;
pub const LABEL_NAME_MAX: usize = 1000;
pub const PASSWORD_MIN: usize = 3;

static SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_]+$").unwrap_or_else(|e| unreachable!("slug pattern: {e}"))
});

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn not_null<'a, T>(value: &'a Patch<T>, message: &'static str) -> Result<Option<&'a T>, ValidationError> {
    match value {
        Patch::Absent => Ok(None),
        Patch::Null => Err(violation("must_not_be_null", message)),
        Patch::Value(v) => Ok(Some(v)),
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(violation("blank", "Value cannot be empty."));
    }
    Ok(())
}

/// Task status slug: lowercase letters, digits and underscores.
pub fn slug(value: &str) -> Result<(), ValidationError> {
    if !SLUG.is_match(value) {
        return Err(violation(
            "slug_format",
            "Slug must consist of lowercase letters, numbers, and underscores only.",
        ));
    }
    Ok(())
}

pub fn label_name(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if value.trim().is_empty() || !(LABEL_NAME_MIN..=LABEL_NAME_MAX).contains(&len) {
        return Err(violation(
            "length",
            "The label name must be between 3 and 1000 characters long.",
        ));
    }
    Ok(())
}

pub fn patch_email(value: &Patch<String>) -> Result<(), ValidationError> {
    if let Some(email) = not_null(value, "Email cannot be null")? {
        if !email.validate_email() {
            return Err(violation("email", "Email must be a valid format"));
        }
    }
    Ok(())
}

pub fn patch_password(value: &Patch<String>) -> Result<(), ValidationError> {
    if let Some(password) = not_null(value, "Password cannot be null")? {
        if password.chars().count() < PASSWORD_MIN {
            return Err(violation(
                "length",
                "Password must be at least 3 characters long",
            ));
        }
    }
    Ok(())
}

pub fn patch_status_name(value: &Patch<String>) -> Result<(), ValidationError> {
    if let Some(name) = not_null(value, "Name cannot be null.")? {
        if name.trim().is_empty() {
            return Err(violation("blank", "Name cannot be empty."));
        }
    }
    Ok(())
}

pub fn patch_slug(value: &Patch<String>) -> Result<(), ValidationError> {
    match not_null(value, "Slug cannot be null.")? {
        Some(s) => slug(s),
        None => Ok(()),
    }
}

pub fn patch_label_name(value: &Patch<String>) -> Result<(), ValidationError> {
    match not_null(value, "The label name cannot be null.")? {
        Some(name) => label_name(name),
        None => Ok(()),
    }
}

pub fn patch_title(value: &Patch<String>) -> Result<(), ValidationError> {
    if let Some(title) = not_null(value, "Title cannot be null.")? {
        if title.is_empty() {
            return Err(violation(
                "length",
                "Title must contain at least 1 character.",
            ));
        }
    }
    Ok(())
}

pub fn patch_task_status(value: &Patch<String>) -> Result<(), ValidationError> {
    if let Some(status) = not_null(value, "Status cannot be null.")? {
        if status.trim().is_empty() {
            return Err(violation("blank", "Status cannot be empty."));
        }
    }
    Ok(())
}
