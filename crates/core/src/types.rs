//! Wire types shared across the engine.
//!
//! The collaborator services speak camelCase JSON; everything here carries
//! `rename_all = "camelCase"` so the Rust side stays snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A registered monitoring module, as served by the module registry.
///
/// Read-only input for the engine: the registry owns the descriptor, we only
/// consume it to locate code and seed execution input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub id: Uuid,
    pub name: String,
    /// Clone URL, or a browse URL encoding repo + branch + path.
    #[serde(default)]
    pub repository: Option<String>,
    /// Subfolder inside the repository holding the module code.
    #[serde(default)]
    pub subfolder: Option<String>,
    /// Default input fields merged into every execution document.
    #[serde(default)]
    pub default_inputs: Map<String, Value>,
    /// Output fields the module declares it will produce.
    #[serde(default)]
    pub outputs: Value,
}

/// Site identity used for input enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub domain: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A plugin attached to a site, including its declared outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub requirements: Value,
    #[serde(default)]
    pub fqdn: Option<String>,
    #[serde(default)]
    pub outputs: Value,
}

/// One completed module execution. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    #[serde(default)]
    pub site_id: Option<Uuid>,
    pub module_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl ExecutionRecord {
    pub fn new(site_id: Option<Uuid>, module_id: Uuid, data: Value) -> Self {
        Self {
            site_id,
            module_id,
            timestamp: Utc::now(),
            data,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
