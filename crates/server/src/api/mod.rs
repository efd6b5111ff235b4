//! API route handlers.

pub mod execute;
pub mod health;
pub mod results;
pub mod schedule;

pub use execute::execute_module;
pub use health::health;
pub use results::latest_result;
pub use schedule::{schedule_module, schedules_list, unschedule_module};
