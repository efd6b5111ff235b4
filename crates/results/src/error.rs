//! Result store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
