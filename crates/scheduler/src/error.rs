//! Scheduler error types.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("module {module_id} is already scheduled for site {site_id}")]
    AlreadyScheduled { site_id: Uuid, module_id: Uuid },

    #[error("module {module_id} is not scheduled for site {site_id}")]
    NotScheduled { site_id: Uuid, module_id: Uuid },
}
