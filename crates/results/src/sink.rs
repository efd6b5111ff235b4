//! Best-effort persistence facade over a [`ResultStore`].

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use watchtower_core::extract::reparse_wrapped;
use watchtower_core::ExecutionRecord;

use crate::store::ResultStore;

/// Hands execution results to the store and serves the latest back out.
///
/// A persistence outage must never turn a successful execution into a failed
/// response, so `save` logs store errors instead of returning them.
pub struct ResultSink {
    store: Arc<dyn ResultStore>,
}

impl ResultSink {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }

    /// Persist a record, swallowing (and logging) store failures.
    pub async fn save(&self, record: &ExecutionRecord) {
        if let Err(e) = self.store.save(record).await {
            warn!(
                module_id = %record.module_id,
                site_id = ?record.site_id,
                error = %e,
                "failed to persist execution result"
            );
        }
    }

    /// Latest stored record for a module, optionally scoped to a site.
    ///
    /// Stored payloads that are raw-text wrappers get the same JSON
    /// extraction tolerance applied on the way out.
    pub async fn latest(
        &self,
        module_id: Uuid,
        site_id: Option<Uuid>,
    ) -> Option<ExecutionRecord> {
        match self.store.latest(module_id, site_id).await {
            Ok(Some(mut record)) => {
                record.data = reparse_wrapped(record.data);
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%module_id, error = %e, "failed to read stored results");
                None
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
