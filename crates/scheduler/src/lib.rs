//! Recurring module execution on cron schedules.
//!
//! One scheduler instance owns every `(site, module)` schedule. Fire times
//! live in an explicit min-queue drained by a single loop task; firing
//! re-arms the entry from its cron expression and triggers the execution
//! without waiting on its outcome, so a failed run never stops a schedule.

pub mod core;
pub mod cron;
pub mod error;
pub mod trigger;

pub use crate::core::{ModuleScheduler, ScheduleStatus};
pub use crate::cron::parse_cron;
pub use crate::error::ScheduleError;
pub use crate::trigger::{ExecuteTrigger, HttpTrigger, TriggerError};
