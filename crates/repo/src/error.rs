//! Materialization error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("module has no repository reference")]
    MissingRepository,

    #[error("git clone failed: {0}")]
    CloneFailed(String),

    #[error("subfolder '{0}' not found in repository")]
    FolderNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
