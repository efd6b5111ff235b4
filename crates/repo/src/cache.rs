//! In-process registry of materialized checkouts.
//!
//! Constructor-injected wherever checkout state is needed (materializer,
//! runner, sweeper) rather than living in module-level globals.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One materialized checkout.
#[derive(Debug, Clone)]
pub struct CachedCheckout {
    pub key: String,
    pub path: PathBuf,
    /// Repository reference the checkout was created from. A lookup with a
    /// different reference invalidates the entry.
    pub repository: String,
    pub last_used: DateTime<Utc>,
}

/// Keyed map of live checkouts.
#[derive(Default)]
pub struct CheckoutCache {
    entries: RwLock<HashMap<String, CachedCheckout>>,
}

impl CheckoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a module checkout: the module id, discriminated by
    /// subfolder so one repository can back several modules.
    pub fn cache_key(module_id: Uuid, subfolder: Option<&str>) -> String {
        match subfolder {
            Some(sub) if !sub.is_empty() => format!("{module_id}::{sub}"),
            _ => module_id.to_string(),
        }
    }

    /// Return the checkout path for `key` if the entry is still valid:
    /// same repository reference and the directory still exists on disk.
    /// Bumps `last_used` on hit. Invalid entries are dropped.
    pub fn valid_path(&self, key: &str, repository: &str) -> Option<PathBuf> {
        let mut entries = self.entries.write().expect("checkout cache poisoned");
        match entries.get_mut(key) {
            Some(entry) if entry.repository == repository && entry.path.exists() => {
                entry.last_used = Utc::now();
                Some(entry.path.clone())
            }
            Some(_) => {
                // Stale reference or vanished directory: rematerialize.
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Register (or replace) the checkout for `key`.
    pub fn insert(&self, key: &str, path: PathBuf, repository: &str) {
        let mut entries = self.entries.write().expect("checkout cache poisoned");
        entries.insert(
            key.to_string(),
            CachedCheckout {
                key: key.to_string(),
                path,
                repository: repository.to_string(),
                last_used: Utc::now(),
            },
        );
    }

    /// Bump `last_used` for `key` (no-op for unknown keys).
    pub fn touch(&self, key: &str) {
        let mut entries = self.entries.write().expect("checkout cache poisoned");
        if let Some(entry) = entries.get_mut(key) {
            entry.last_used = Utc::now();
        }
    }

    /// Paths of all live entries. The sweeper never deletes these.
    pub fn live_paths(&self) -> HashSet<PathBuf> {
        let entries = self.entries.read().expect("checkout cache poisoned");
        entries.values().map(|e| e.path.clone()).collect()
    }

    /// Whether `path` belongs to a live entry.
    pub fn is_live(&self, path: &Path) -> bool {
        let entries = self.entries.read().expect("checkout cache poisoned");
        entries.values().any(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("checkout cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ────────────────────────────────────────────────────────────
