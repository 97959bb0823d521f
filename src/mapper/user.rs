use crate::errors::AppError;
use crate::models::patch::Patch;
use crate::models::user::{CreateUser, NewUser, UpdateUser, User, UserChanges, UserResponse};

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            created_at: u.created_at,
        }
    }
}

/// Map a validated create DTO; `hash` turns the plaintext password into a digest.
pub fn to_new_user<H>(input: CreateUser, hash: H) -> Result<NewUser, AppError>
where
    H: FnOnce(&str) -> Result<String, AppError>,
{
    let email = input
        .email
        .ok_or_else(|| AppError::invalid_field("email", "required", "Email cannot be blank"))?;
    let password = input.password.ok_or_else(|| {
        AppError::invalid_field("password", "required", "Password cannot be blank")
    })?;

    Ok(NewUser {
        email,
        first_name: input.first_name,
        last_name: input.last_name,
        password_hash: hash(&password)?,
        is_admin: false,
    })
}

/// Map a validated update DTO into a change set.
pub fn to_changes<H>(input: UpdateUser, hash: H) -> Result<UserChanges, AppError>
where
    H: FnOnce(&str) -> Result<String, AppError>,
{
    let email = input
        .email
        .into_required()
        .ok_or_else(|| AppError::invalid_field("email", "must_not_be_null", "Email cannot be null"))?;
    let password = input.password.into_required().ok_or_else(|| {
        AppError::invalid_field("password", "must_not_be_null", "Password cannot be null")
    })?;

    let password_hash = match password {
        Some(plain) => Some(hash(&plain)?),
        None => None,
    };

    Ok(UserChanges {
        email,
        first_name: input.first_name,
        last_name: input.last_name,
        password_hash,
    })
}

/// Apply a change set to a stored user in place.
pub fn apply_changes(user: &mut User, changes: UserChanges) {
    if let Some(email) = changes.email {
        user.email = email;
    }
    changes.first_name.apply_to(&mut user.first_name);
    changes.last_name.apply_to(&mut user.last_name);
    if let Some(hash) = changes.password_hash {
        user.password_hash = hash;
    }
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name == Patch::Absent
            && self.last_name == Patch::Absent
            && self.password_hash.is_none()
    }
}
