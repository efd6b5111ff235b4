//! Read-only lookups against the module, site, and plugin registries.

use uuid::Uuid;

use watchtower_core::config::RegistryConfig;
use watchtower_core::{ModuleDescriptor, Plugin, Site};

use crate::error::RegistryError;
use crate::token::ServiceTokenProvider;

/// HTTP client over the collaborator registries.
///
/// One shared `reqwest::Client` (connection pooling) and one token provider
/// serve all three services.
pub struct RegistryClient {
    config: RegistryConfig,
    client: reqwest::Client,
    tokens: ServiceTokenProvider,
}

impl RegistryClient {
    pub fn new(
        config: RegistryConfig,
        client: reqwest::Client,
        tokens: ServiceTokenProvider,
    ) -> Self {
        Self {
            config,
            client,
            tokens,
        }
    }

    /// Fetch a module descriptor by id.
    pub async fn module(&self, module_id: Uuid) -> Result<ModuleDescriptor, RegistryError> {
        let url = format!("{}/modules/{}", self.config.module_url, module_id);
        self.get_json("module registry", &url, &module_id.to_string())
            .await
    }

    /// Fetch site identity by id.
    pub async fn site(&self, site_id: Uuid) -> Result<Site, RegistryError> {
        let url = format!("{}/sites/{}", self.config.site_url, site_id);
        self.get_json("site service", &url, &site_id.to_string())
            .await
    }

    /// Fetch the plugins attached to a site, including declared outputs.
    pub async fn site_plugins(&self, site_id: Uuid) -> Result<Vec<Plugin>, RegistryError> {
        let url = format!("{}/plugins?siteId={}", self.config.plugin_url, site_id);
        self.get_json("plugin service", &url, &site_id.to_string())
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        subject: &str,
    ) -> Result<T, RegistryError> {
        let token = self.tokens.token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(format!("{service}: {subject}")));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(service, %status, url, "registry lookup failed");
            return Err(RegistryError::Status {
                service,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
