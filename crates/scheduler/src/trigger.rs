//! Execution trigger invoked when a schedule fires.
//!
//! Scheduled runs go through the engine's own HTTP execute endpoint, so
//! manual and scheduled executions share one code path. Tests substitute a
//! recording implementation.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("execute endpoint returned {0}")]
    Status(u16),
}

#[async_trait]
pub trait ExecuteTrigger: Send + Sync {
    async fn trigger(&self, site_id: Uuid, module_id: Uuid) -> Result<(), TriggerError>;
}

/// Production trigger: POSTs to `/execute/{module_id}` on the engine itself.
pub struct HttpTrigger {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTrigger {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl ExecuteTrigger for HttpTrigger {
    async fn trigger(&self, site_id: Uuid, module_id: Uuid) -> Result<(), TriggerError> {
        let url = format!("{}/execute/{}", self.base_url, module_id);
        debug!(%url, %site_id, "firing scheduled execution");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "siteId": site_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriggerError::Status(status.as_u16()));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_trigger_trims_trailing_slash() {
        let t = HttpTrigger::new("http://127.0.0.1:3010/", reqwest::Client::new());
        assert_eq!(t.base_url, "http://127.0.0.1:3010");
    }
}
