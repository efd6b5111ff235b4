//! Orchestrates one module execution end to end.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use watchtower_core::extract::parse_module_output;
use watchtower_core::ExecutionRecord;
use watchtower_registry::RegistryClient;
use watchtower_repo::{CheckoutCache, Materializer};
use watchtower_results::ResultSink;

use crate::entrypoint::find_entrypoint;
use crate::error::ExecuteError;
use crate::input::build_input;
use crate::process::{install_entrypoint_deps, run_entrypoint};

pub struct ModuleRunner {
    registry: Arc<RegistryClient>,
    materializer: Arc<Materializer>,
    cache: Arc<CheckoutCache>,
    sink: Arc<ResultSink>,
}

impl ModuleRunner {
    pub fn new(
        registry: Arc<RegistryClient>,
        materializer: Arc<Materializer>,
        cache: Arc<CheckoutCache>,
        sink: Arc<ResultSink>,
    ) -> Self {
        Self {
            registry,
            materializer,
            cache,
            sink,
        }
    }

    /// Execute a module once and return its (persisted) result.
    pub async fn execute(
        &self,
        module_id: Uuid,
        site_id: Option<Uuid>,
        custom_inputs: Map<String, Value>,
    ) -> Result<ExecutionRecord, ExecuteError> {
        let descriptor = self.registry.module(module_id).await?;

        let checkout = self
            .materializer
            .materialize(
                module_id,
                descriptor.repository.as_deref(),
                descriptor.subfolder.as_deref(),
            )
            .await?;

        let input = build_input(&descriptor, &custom_inputs, site_id, &self.registry).await;

        let entrypoint = find_entrypoint(&checkout)
            .ok_or_else(|| ExecuteError::EntrypointMissing(checkout.display().to_string()))?;

        install_entrypoint_deps(&entrypoint).await;

        let output = run_entrypoint(&entrypoint, &Value::Object(input)).await?;
        if !output.stderr.trim().is_empty() {
            warn!(%module_id, stderr = %output.stderr.trim(), "module wrote to stderr");
        }

        let data = parse_module_output(&output.stdout);

        let key = CheckoutCache::cache_key(module_id, descriptor.subfolder.as_deref());
        self.cache.touch(&key);

        let record = ExecutionRecord::new(site_id, module_id, data);
        self.sink.save(&record).await;

        info!(
            %module_id,
            site_id = ?site_id,
            module = %descriptor.name,
            "module execution complete"
        );

        Ok(record)
    }
}
