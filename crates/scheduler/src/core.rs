//! Schedule state and the fire loop.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cron::parse_cron;
use crate::error::ScheduleError;
use crate::trigger::ExecuteTrigger;

/// Schedules are keyed by (site, module); at most one entry per pair.
pub type ScheduleKey = (Uuid, Uuid);

/// Public view of an active schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    pub site_id: Uuid,
    pub module_id: Uuid,
    pub cron_expression: String,
    pub next_fire: DateTime<Utc>,
}

struct Entry {
    cron_expr: String,
    schedule: Schedule,
    /// Generation counter; queue items carry the seq they were armed with,
    /// so stale items (cancelled or re-armed entries) are discarded at pop.
    seq: u64,
    next_fire: DateTime<Utc>,
}

/// Queue item ordering: earliest fire time first (via `Reverse`).
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct QueueItem {
    fire_at: DateTime<Utc>,
    seq: u64,
    key: ScheduleKey,
}

#[derive(Default)]
struct State {
    entries: HashMap<ScheduleKey, Entry>,
    queue: BinaryHeap<Reverse<QueueItem>>,
    next_seq: u64,
}

/// Cron scheduler for recurring module executions.
///
/// `schedule`/`unschedule` mutate the entry map; a single [`run`] loop owns
/// the fire queue, sleeping until the earliest entry (or a change
/// notification) and re-arming fired entries from their cron expressions.
pub struct ModuleScheduler {
    state: Mutex<State>,
    changed: Notify,
    trigger: Arc<dyn ExecuteTrigger>,
    stopped: AtomicBool,
}

impl ModuleScheduler {
    pub fn new(trigger: Arc<dyn ExecuteTrigger>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
            changed: Notify::new(),
            trigger,
            stopped: AtomicBool::new(false),
        })
    }

    /// Register a recurring execution. Returns the first fire time.
    pub fn schedule(
        &self,
        site_id: Uuid,
        module_id: Uuid,
        cron_expression: &str,
    ) -> Result<DateTime<Utc>, ScheduleError> {
        let schedule = parse_cron(cron_expression).map_err(|e| ScheduleError::InvalidCron {
            expr: cron_expression.to_string(),
            reason: e.to_string(),
        })?;

        let next_fire = schedule
            .upcoming(Utc)
            .next()
            .ok_or_else(|| ScheduleError::InvalidCron {
                expr: cron_expression.to_string(),
                reason: "expression has no upcoming fire time".to_string(),
            })?;

        let key = (site_id, module_id);
        let mut state = self.state.lock().expect("scheduler state poisoned");

        if state.entries.contains_key(&key) {
            return Err(ScheduleError::AlreadyScheduled { site_id, module_id });
        }

        state.next_seq += 1;
        let seq = state.next_seq;
        state.entries.insert(
            key,
            Entry {
                cron_expr: cron_expression.to_string(),
                schedule,
                seq,
                next_fire,
            },
        );
        state.queue.push(Reverse(QueueItem {
            fire_at: next_fire,
            seq,
            key,
        }));
        drop(state);

        self.changed.notify_one();
        info!(%site_id, %module_id, cron = cron_expression, next = %next_fire, "module scheduled");

        Ok(next_fire)
    }

    /// Cancel a recurring execution.
    pub fn unschedule(&self, site_id: Uuid, module_id: Uuid) -> Result<(), ScheduleError> {
        let key = (site_id, module_id);
        let mut state = self.state.lock().expect("scheduler state poisoned");
        if state.entries.remove(&key).is_none() {
            return Err(ScheduleError::NotScheduled { site_id, module_id });
        }
        // The queue item for this entry is now stale and will be discarded
        // when the loop reaches it.
        drop(state);

        self.changed.notify_one();
        info!(%site_id, %module_id, "module unscheduled");
        Ok(())
    }

    /// Snapshot of all active schedules, earliest fire first.
    pub fn entries(&self) -> Vec<ScheduleStatus> {
        let state = self.state.lock().expect("scheduler state poisoned");
        let mut statuses: Vec<ScheduleStatus> = state
            .entries
            .iter()
            .map(|(&(site_id, module_id), entry)| ScheduleStatus {
                site_id,
                module_id,
                cron_expression: entry.cron_expr.clone(),
                next_fire: entry.next_fire,
            })
            .collect();
        statuses.sort_by_key(|s| s.next_fire);
        statuses
    }

    /// Drain the fire queue until [`shutdown`](Self::shutdown).
    ///
    /// Firing never blocks on the execution outcome: the trigger runs in its
    /// own task while the entry is re-armed immediately.
    pub async fn run(self: Arc<Self>) {
        info!("module scheduler started");
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }

            let (due, next_fire) = self.collect_due(Utc::now());

            for (site_id, module_id) in due {
                let trigger = self.trigger.clone();
                tokio::spawn(async move {
                    if let Err(e) = trigger.trigger(site_id, module_id).await {
                        warn!(%site_id, %module_id, error = %e, "scheduled execution failed");
                    }
                });
            }

            match next_fire {
                Some(at) => {
                    let delay = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.changed.notified() => {}
                    }
                }
                None => self.changed.notified().await,
            }
        }
        info!("module scheduler stopped");
    }

    /// Pop every due queue item, re-arming live entries. Returns the due
    /// keys and the fire time of the new queue head.
    fn collect_due(&self, now: DateTime<Utc>) -> (Vec<ScheduleKey>, Option<DateTime<Utc>>) {
        let mut state = self.state.lock().expect("scheduler state poisoned");
        let mut due = Vec::new();

        loop {
            let head = match state.queue.peek() {
                Some(Reverse(item)) => (item.fire_at, item.seq, item.key),
                None => break,
            };
            let (fire_at, seq, key) = head;

            // Discard stale items: entry cancelled or re-armed since push.
            let live = state.entries.get(&key).map(|e| e.seq) == Some(seq);
            if !live {
                state.queue.pop();
                continue;
            }

            if fire_at > now {
                break;
            }

            state.queue.pop();
            due.push(key);

            let next = state
                .entries
                .get(&key)
                .and_then(|e| e.schedule.after(&now).next());
            match next {
                Some(next_at) => {
                    state.next_seq += 1;
                    let new_seq = state.next_seq;
                    if let Some(entry) = state.entries.get_mut(&key) {
                        entry.seq = new_seq;
                        entry.next_fire = next_at;
                    }
                    state.queue.push(Reverse(QueueItem {
                        fire_at: next_at,
                        seq: new_seq,
                        key,
                    }));
                }
                None => {
                    state.entries.remove(&key);
                    warn!(site_id = %key.0, module_id = %key.1, "cron expression exhausted; schedule removed");
                }
            }
        }

        let next_fire = state.queue.peek().map(|Reverse(item)| item.fire_at);
        (due, next_fire)
    }

    /// Stop the fire loop. Pending schedule state is kept; a new `run` call
    /// resumes it.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        // notify_one stores a permit when the loop is not currently waiting,
        // so a shutdown issued mid-tick is not lost.
        self.changed.notify_one();
    }
}

// ── Tests ────────────────────────────────────────────────────────────
