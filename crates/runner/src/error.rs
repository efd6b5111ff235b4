//! Execution error types.

use thiserror::Error;

use watchtower_registry::RegistryError;
use watchtower_repo::MaterializeError;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("materialization failed: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("module lookup failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("no module entrypoint found under {0}")]
    EntrypointMissing(String),

    #[error("module exited with status {code}: {stderr}")]
    ExecutionFailure { code: i32, stderr: String },

    #[error("failed to run module process: {0}")]
    Process(#[from] std::io::Error),

    #[error("failed to encode execution input: {0}")]
    InputEncode(#[from] serde_json::Error),
}
