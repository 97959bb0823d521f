//! Business logic services.

pub mod auth;
pub mod bootstrap;
pub mod error_reporting;
pub mod label;
pub mod task;
pub mod task_status;
pub mod user;
pub mod verifier;
