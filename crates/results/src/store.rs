//! The persistence seam for execution results.

use async_trait::async_trait;
use uuid::Uuid;

use watchtower_core::ExecutionRecord;

use crate::error::ResultStoreError;

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist one execution record.
    async fn save(&self, record: &ExecutionRecord) -> Result<(), ResultStoreError>;

    /// Most recent record for a module. With a site id the lookup is scoped
    /// to that site; without, the newest record across all sites wins.
    async fn latest(
        &self,
        module_id: Uuid,
        site_id: Option<Uuid>,
    ) -> Result<Option<ExecutionRecord>, ResultStoreError>;
}
