//! Execution input assembly.
//!
//! The input document a module receives on stdin is built in layers:
//! the module's declared defaults, then caller-supplied custom fields, then
//! (when a site is involved) enrichment objects under `site`, `plugins`,
//! and `pluginOutputs`. Enrichment is strictly best-effort: a failed
//! collaborator lookup (including token acquisition) degrades the document
//! rather than failing the execution.

use serde_json::{json, Map, Value};
use tracing::warn;
use uuid::Uuid;

use watchtower_core::ModuleDescriptor;
use watchtower_registry::RegistryClient;

/// Build the full input document for one execution.
pub async fn build_input(
    descriptor: &ModuleDescriptor,
    custom: &Map<String, Value>,
    site_id: Option<Uuid>,
    registry: &RegistryClient,
) -> Map<String, Value> {
    let mut document = descriptor.default_inputs.clone();
    for (key, value) in custom {
        document.insert(key.clone(), value.clone());
    }

    let Some(site_id) = site_id else {
        return document;
    };

    match registry.site(site_id).await {
        Ok(site) => {
            document.insert(
                "site".to_string(),
                json!({
                    "id": site.id,
                    "domain": site.domain,
                    "name": site.name,
                    "description": site.description,
                }),
            );
        }
        Err(e) => {
            warn!(%site_id, error = %e, "site enrichment failed; continuing without it");
        }
    }

    match registry.site_plugins(site_id).await {
        Ok(plugins) => {
            let mut by_name = Map::new();
            let mut outputs = Map::new();
            for plugin in plugins {
                by_name.insert(
                    plugin.name.clone(),
                    json!({
                        "id": plugin.id,
                        "name": plugin.name,
                        "requirements": plugin.requirements,
                        "fqdn": plugin.fqdn,
                    }),
                );
                outputs.insert(plugin.name, plugin.outputs);
            }
            document.insert("plugins".to_string(), Value::Object(by_name));
            document.insert("pluginOutputs".to_string(), Value::Object(outputs));
        }
        Err(e) => {
            warn!(%site_id, error = %e, "plugin enrichment failed; continuing without it");
        }
    }

    document
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::{get, post};
    use axum::{Json, Router};

    use watchtower_core::config::{AuthConfig, RegistryConfig};
    use watchtower_registry::ServiceTokenProvider;

    fn descriptor(defaults: Value) -> ModuleDescriptor {
        ModuleDescriptor {
            id: Uuid::new_v4(),
            name: "uptime".to_string(),
            repository: None,
            subfolder: None,
            default_inputs: defaults.as_object().cloned().unwrap_or_default(),
            outputs: Value::Null,
        }
    }

    /// Fake site/plugin services; `healthy` controls whether lookups work.
    async fn spawn_collaborators(healthy: bool) -> String {
        let app = Router::new()
            .route(
                "/auth/service-token",
                post(|| async { Json(json!({"token": "tkn", "expiresIn": 900})) }),
            )
            .route(
                "/sites/{id}",
                get(move |axum::extract::Path(id): axum::extract::Path<Uuid>| async move {
                    if healthy {
                        Ok(Json(json!({
                            "id": id,
                            "domain": "shop.example.com",
                            "name": "Shop",
                            "description": "storefront"
                        })))
                    } else {
                        Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }),
            )
            .route(
                "/plugins",
                get(move || async move {
                    if healthy {
                        Ok(Json(json!([{
                            "id": Uuid::new_v4(),
                            "name": "nginx",
                            "requirements": {"port": 443},
                            "fqdn": "shop.example.com",
                            "outputs": ["statusCode", "latencyMs"]
                        }])))
                    } else {
                        Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn registry_for(base: &str) -> RegistryClient {
        let http = reqwest::Client::new();
        let tokens = ServiceTokenProvider::new(
            AuthConfig {
                token_url: format!("{base}/auth/service-token"),
                service_id: Some("module-service".to_string()),
                service_secret: Some("s3cret".to_string()),
            },
            http.clone(),
        );
        RegistryClient::new(
            RegistryConfig {
                module_url: base.to_string(),
                site_url: base.to_string(),
                plugin_url: base.to_string(),
            },
            http,
            tokens,
        )
    }

    #[tokio::test]
    async fn test_custom_fields_override_defaults() {
        let base = spawn_collaborators(true).await;
        let registry = registry_for(&base);
        let descriptor = descriptor(json!({"timeoutSecs": 5, "retries": 2}));

        let mut custom = Map::new();
        custom.insert("timeoutSecs".to_string(), json!(30));

        let doc = build_input(&descriptor, &custom, None, &registry).await;
        assert_eq!(doc["timeoutSecs"], 30);
        assert_eq!(doc["retries"], 2);
        assert!(doc.get("site").is_none(), "no site requested");
    }

    #[tokio::test]
    async fn test_site_enrichment_adds_well_known_keys() {
        let base = spawn_collaborators(true).await;
        let registry = registry_for(&base);
        let descriptor = descriptor(json!({}));

        let doc = build_input(&descriptor, &Map::new(), Some(Uuid::new_v4()), &registry).await;

        assert_eq!(doc["site"]["domain"], "shop.example.com");
        assert_eq!(doc["plugins"]["nginx"]["fqdn"], "shop.example.com");
        assert!(doc["plugins"]["nginx"].get("outputs").is_none());
        assert_eq!(doc["pluginOutputs"]["nginx"][0], "statusCode");
    }

    #[tokio::test]
    async fn test_enrichment_failure_degrades_gracefully() {
        let base = spawn_collaborators(false).await;
        let registry = registry_for(&base);
        let descriptor = descriptor(json!({"timeoutSecs": 5}));

        let doc = build_input(&descriptor, &Map::new(), Some(Uuid::new_v4()), &registry).await;

        // Un-enriched, but otherwise intact.
        assert_eq!(doc["timeoutSecs"], 5);
        assert!(doc.get("site").is_none());
        assert!(doc.get("plugins").is_none());
        assert!(doc.get("pluginOutputs").is_none());
    }
}
