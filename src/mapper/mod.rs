//! Conversions between wire DTOs and storage models.
//!
//! Every conversion is a plain function or `From` impl. Update DTOs become
//! change sets without losing the omitted/null distinction carried by
//! [`Patch`](crate::models::patch::Patch).

pub mod label;
pub mod task;
pub mod task_status;
pub mod user;
