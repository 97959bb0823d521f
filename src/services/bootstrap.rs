//! Startup data initializer: admin account, default statuses and labels.
//!
//! Each record is created only when missing, so restarts are harmless.

use crate::config::BootstrapConfig;
use crate::db::Store;
use crate::errors::AppError;
use crate::models::label::NewLabel;
use crate::models::task_status::NewTaskStatus;
use crate::models::user::NewUser;
use crate::services::auth::hash_password;

/// Default workflow statuses as (name, slug).
pub const DEFAULT_STATUSES: [(&str, &str); 5] = [
    ("Draft", "draft"),
    ("To Review", "to_review"),
    ("To Be Fixed", "to_be_fixed"),
    ("To Publish", "to_publish"),
    ("Published", "published"),
];

pub const DEFAULT_LABELS: [&str; 2] = ["feature", "bug"];

/// Counts of records created by a bootstrap run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub users: usize,
    pub statuses: usize,
    pub labels: usize,
}

pub async fn run(store: &dyn Store, config: &BootstrapConfig) -> Result<BootstrapReport, AppError> {
    let mut report = BootstrapReport::default();

    if store.find_user_by_email(&config.admin_email).await?.is_none() {
        store
            .insert_user(NewUser {
                email: config.admin_email.clone(),
                first_name: None,
                last_name: None,
                password_hash: hash_password(&config.admin_password)?,
                is_admin: true,
            })
            .await?;
        report.users += 1;
    }

    for (name, slug) in DEFAULT_STATUSES {
        if store.find_status_by_slug(slug).await?.is_none() {
            store
                .insert_status(NewTaskStatus {
                    name: name.to_string(),
                    slug: slug.to_string(),
                })
                .await?;
            report.statuses += 1;
        }
    }

    for name in DEFAULT_LABELS {
        if store.find_label_by_name(name).await?.is_none() {
            store
                .insert_label(NewLabel {
                    name: name.to_string(),
                })
                .await?;
            report.labels += 1;
        }
    }

    tracing::info!(
        users = report.users,
        statuses = report.statuses,
        labels = report.labels,
        "Bootstrap data ensured"
    );
    Ok(report)
}
