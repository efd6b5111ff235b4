//! Background task startup.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::state::AppState;

/// Spawn the long-running engine tasks: the checkout sweeper (one sweep at
/// startup, then on its interval) and the scheduler fire loop.
pub fn spawn_background_tasks(state: &Arc<AppState>) -> Vec<JoinHandle<()>> {
    let sweep_interval =
        Duration::from_secs(state.config.workspace.sweep_interval_hours * 3600);
    let sweeper = state.sweeper.spawn(sweep_interval);
    let scheduler = tokio::spawn(state.scheduler.clone().run());
    vec![sweeper, scheduler]
}
