//! Domain records, change sets and wire DTOs.

pub mod label;
pub mod pagination;
pub mod patch;
pub mod task;
pub mod task_status;
pub mod user;
