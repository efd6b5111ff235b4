//! In-memory result store for tests and database-less boots.

use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use watchtower_core::ExecutionRecord;

use crate::error::ResultStoreError;
use crate::store::ResultStore;

#[derive(Default)]
pub struct MemoryResultStore {
    records: RwLock<Vec<ExecutionRecord>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("result store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn save(&self, record: &ExecutionRecord) -> Result<(), ResultStoreError> {
        let mut records = self.records.write().expect("result store poisoned");
        records.push(record.clone());
        Ok(())
    }

    async fn latest(
        &self,
        module_id: Uuid,
        site_id: Option<Uuid>,
    ) -> Result<Option<ExecutionRecord>, ResultStoreError> {
        let records = self.records.read().expect("result store poisoned");
        let found = records
            .iter()
            .filter(|r| r.module_id == module_id)
            .filter(|r| site_id.is_none() || r.site_id == site_id)
            .max_by_key(|r| r.timestamp)
            .cloned();
        Ok(found)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
