//! Periodic reclamation of stale checkouts.
//!
//! Checkouts live under one working root, one top-level directory each. A
//! sweep deletes directories that are both unreferenced by the live cache
//! and older than the retention window. The sweeper runs once at startup,
//! then on a fixed interval until shut down; it can be restarted with a
//! different interval.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CheckoutCache;

pub struct CheckoutSweeper {
    work_dir: PathBuf,
    cache: Arc<CheckoutCache>,
    retention: Duration,
    shutdown: Notify,
    stopped: AtomicBool,
}

impl CheckoutSweeper {
    /// Default retention: checkouts unused for 7 days are removed.
    pub const DEFAULT_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);
    /// Default sweep interval: once a day.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn new(work_dir: PathBuf, cache: Arc<CheckoutCache>, retention: Duration) -> Self {
        Self {
            work_dir,
            cache,
            retention,
            shutdown: Notify::new(),
            stopped: AtomicBool::new(false),
        }
    }

    /// Delete stale, unreferenced checkout directories. Returns the number
    /// removed. Safe to call concurrently with normal traffic and tolerant
    /// of directories appearing or disappearing mid-sweep.
    pub fn sweep(&self) -> usize {
        let entries = match std::fs::read_dir(&self.work_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.work_dir.display(), error = %e, "work root not readable; nothing to sweep");
                return 0;
            }
        };

        let live = self.cache.live_paths();
        let mut removed = 0usize;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "failed to read work root entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            // Live checkouts are never deleted, regardless of age.
            if live.contains(&path) {
                continue;
            }

            let age = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => match modified.elapsed() {
                    Ok(age) => age,
                    // Timestamp in the future (clock skew): treat as fresh.
                    Err(_) => continue,
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to stat checkout; skipping");
                    continue;
                }
            };

            if age >= self.retention {
                match std::fs::remove_dir_all(&path) {
                    Ok(()) => {
                        info!(path = %path.display(), age_secs = age.as_secs(), "removed stale checkout");
                        removed += 1;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to remove stale checkout");
                    }
                }
            }
        }

        if removed > 0 {
            info!(removed, "checkout sweep complete");
        } else {
            debug!("checkout sweep complete; nothing to remove");
        }
        removed
    }

    /// Run one sweep immediately, then sweep on `interval` until
    /// [`shutdown`](Self::shutdown) is called.
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        self.stopped.store(false, Ordering::SeqCst);
        let sweeper = self.clone();

        tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                retention_secs = sweeper.retention.as_secs(),
                "checkout sweeper started"
            );
            loop {
                sweeper.sweep();
                if sweeper.stopped.load(Ordering::SeqCst) {
                    break;
                }
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = sweeper.shutdown.notified() => {}
                }
                if sweeper.stopped.load(Ordering::SeqCst) {
                    break;
                }
            }
            info!("checkout sweeper stopped");
        })
    }

    /// Stop the background loop. The sweeper can be re-spawned afterwards
    /// (with a different interval if desired).
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }
}

// ── Tests ────────────────────────────────────────────────────────────
