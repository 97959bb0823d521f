//! Request middleware and access-control extractors.

pub mod auth;
pub mod error_capture;
pub mod rbac;
